use super::dictionary::{MANUAL_REVIEW_SENTINEL, MISSING_DESCRIPTION_PLACEHOLDER};
use super::table_cells::CodedValue;
use super::words::DetectedTable;
use super::*;

fn line(tokens: &[&str], x_start: f64, y_top: f64) -> Vec<PositionedWord> {
    let mut x = x_start;
    tokens
        .iter()
        .map(|token| {
            let width = 8.0 * token.chars().count() as f64;
            let word = PositionedWord::new(token, x, x + width, y_top, y_top + 9.0);
            x += width + 4.0;
            word
        })
        .collect()
}

fn table(top: f64, bottom: f64, cells: &[&str]) -> DetectedTable {
    DetectedTable {
        bbox: [40.0, top, 500.0, bottom],
        cells: cells.iter().map(|cell| cell.to_string()).collect(),
        text_top: Some(top + 2.0),
    }
}

fn current_format_document() -> LayoutDocument {
    let mut first = LayoutPage::default();
    first.words.extend(line(&["#", "Observations:", "5209"], 300.0, 30.0));
    first.words.extend(line(&["Variable", "name:", "SEX"], 40.0, 100.0));
    first.words.extend(line(&["Description:", "Sex"], 40.0, 112.0));
    first.words.extend(line(&["Variable", "name:", "AGE1"], 40.0, 300.0));
    first.words.extend(line(&["Description:", "Age"], 40.0, 312.0));
    first.words.extend(line(&["Variable", "name:", "CHD"], 40.0, 680.0));
    first.words.extend(line(&["Page", "1", "of", "2"], 250.0, 760.0));
    first.tables = vec![
        table(150.0, 190.0, &["1", "2", "Male", "Female", "2400", "2809"]),
        table(600.0, 640.0, &["Exam", "Form"]),
    ];

    let mut second = LayoutPage::default();
    second.words.extend(line(&["Variable", "name:", "BMI"], 40.0, 200.0));
    second.words.extend(line(&["Description:", "Body"], 40.0, 212.0));
    second.tables = vec![
        table(60.0, 100.0, &["0", "1", "No", "Yes"]),
        table(250.0, 290.0, &["1", "2", "Underweight", "Normal"]),
    ];

    LayoutDocument {
        pages: vec![first, second],
    }
}

const CURRENT_FORMAT_OCR: &str = "\
Variable name: SEX
Description: Sex of participant
Code or Value Description
Variable name: AGE1
Description: Age at exam 1
Units: years
CHD
Description: Coronary heart
disease status
Page 1 of 2
!!!PAGEBREAK!!!
Variable name: BMI
Description: Body mass index
Code or Value Description
";

#[test]
fn current_format_binds_tables_and_descriptions_in_document_order() {
    let patterns = ManualPatterns::new().expect("patterns");
    let manual = extract_current_format(
        &current_format_document(),
        CURRENT_FORMAT_OCR,
        &patterns,
        &LayoutThresholds::default(),
    );

    let names = manual
        .variables
        .iter()
        .map(|variable| variable.name.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(names, vec!["SEX", "AGE1", "CHD", "BMI"]);
    assert_eq!(manual.total_observations, Some(5209));

    let sex = &manual.variables[0];
    assert_eq!(sex.description, "Sex of participant");
    let sex_values = sex.values.as_ref().expect("sex table");
    assert_eq!(sex_values.get("2"), Some(&CodedValue::new("Female", Some(2809))));
    let sex_row = sex.dictionary_row();
    assert_eq!(sex_row.n, Some(5209));
    assert_eq!(sex_row.miss, Some(0));

    let age = &manual.variables[1];
    assert!(age.values.is_none());
    assert_eq!(age.dictionary_row().units.as_deref(), Some("years"));

    let chd = &manual.variables[2];
    assert_eq!(chd.description, "Coronary heart disease status");
    assert_eq!(
        chd.values
            .as_ref()
            .and_then(|values| values.get("1"))
            .map(|value| value.description.as_str()),
        Some("Yes")
    );

    let bmi = &manual.variables[3];
    assert_eq!(
        bmi.values
            .as_ref()
            .and_then(|values| values.get("1"))
            .map(|value| value.description.as_str()),
        Some("Underweight")
    );

    assert_eq!(manual.stats.page_count, 2);
    assert_eq!(manual.stats.detected_table_count, 4);
    assert_eq!(manual.stats.coded_table_count, 3);
    assert_eq!(manual.stats.bound_table_count, 3);
    assert_eq!(manual.stats.descriptions_exhausted, 0);
}

#[test]
fn current_format_marks_missing_descriptions() {
    let patterns = ManualPatterns::new().expect("patterns");
    let manual = extract_current_format(
        &current_format_document(),
        "Description:\nCode or Value\n",
        &patterns,
        &LayoutThresholds::default(),
    );

    assert_eq!(manual.variables[0].description, MANUAL_REVIEW_SENTINEL);
    assert_eq!(manual.variables[1].description, MISSING_DESCRIPTION_PLACEHOLDER);
    assert_eq!(manual.stats.descriptions_exhausted, 3);
    assert_eq!(manual.stats.review_needed_count, 4);
    assert!(
        manual
            .variables
            .iter()
            .all(|variable| !variable.description.is_empty())
    );
}

#[test]
fn current_format_merges_split_table_before_binding() {
    let mut first = LayoutPage::default();
    first.words.extend(line(&["Variable", "name:", "RACE"], 40.0, 560.0));
    first.tables = vec![table(600.0, 750.0, &["1", "2", "White", "Black"])];
    let mut second = LayoutPage::default();
    second.tables = vec![table(50.0, 90.0, &["3", "9", "Asian", "Unknown"])];
    let document = LayoutDocument {
        pages: vec![first, second],
    };

    let patterns = ManualPatterns::new().expect("patterns");
    let manual = extract_current_format(
        &document,
        "Description: Race\n",
        &patterns,
        &LayoutThresholds::default(),
    );

    assert_eq!(manual.stats.merged_table_count, 1);
    let values = manual.variables[0].values.as_ref().expect("merged table");
    assert_eq!(
        values.codes().collect::<Vec<&str>>(),
        vec!["1", "2", "3", "9"]
    );
}

#[test]
fn current_format_keeps_last_occurrence_of_repeated_name() {
    let mut first = LayoutPage::default();
    first.words.extend(line(&["Variable", "name:", "SEX"], 40.0, 100.0));
    let mut second = LayoutPage::default();
    second.words.extend(line(&["Variable", "name:", "SEX"], 40.0, 120.0));
    second.tables = vec![table(160.0, 200.0, &["1", "2", "Male", "Female"])];
    let document = LayoutDocument {
        pages: vec![first, second],
    };

    let patterns = ManualPatterns::new().expect("patterns");
    let manual = extract_current_format(
        &document,
        "Description: Sex\n",
        &patterns,
        &LayoutThresholds::default(),
    );

    assert_eq!(manual.variables.len(), 1);
    assert_eq!(manual.stats.duplicate_name_count, 1);
    assert_eq!(manual.variables[0].position.page, 1);
    assert!(manual.variables[0].values.is_some());
}

#[test]
fn current_format_unnamed_label_consumes_its_description() {
    let mut page = LayoutPage::default();
    page.words.extend(line(&["Variable", "name:"], 40.0, 100.0));
    page.words.extend(line(&["Description:", "Unnamed"], 40.0, 112.0));
    page.words.extend(line(&["Variable", "name:", "SEX"], 40.0, 300.0));
    page.words.extend(line(&["Description:", "Sex"], 40.0, 312.0));
    let document = LayoutDocument { pages: vec![page] };

    let patterns = ManualPatterns::new().expect("patterns");
    let manual = extract_current_format(
        &document,
        "Description: Unnamed field\nCode or Value\nDescription: Sex of participant\n",
        &patterns,
        &LayoutThresholds::default(),
    );

    assert_eq!(manual.variables.len(), 1);
    assert_eq!(manual.variables[0].name, "SEX");
    assert_eq!(manual.variables[0].description, "Sex of participant");
    assert_eq!(manual.stats.descriptions_exhausted, 0);
}

fn old_format_document() -> LayoutDocument {
    let mut first = LayoutPage::default();
    first.words.extend(line(&["#", "Observations:", "812"], 100.0, 40.0));
    first.words.extend(line(&["ID", "Participant", "identifier"], 42.0, 100.0));
    first.words.extend(line(&["FA101", "Has", "the", "subject", "had", "prior", "MI"], 42.0, 140.0));
    first.words.extend(line(&["1=", "Yes"], 60.0, 155.0));
    first.words.extend(line(&["2=", "No"], 60.0, 170.0));
    first.words.extend(line(&["FA102", "Chest", "pain"], 42.0, 700.0));

    let mut second = LayoutPage::default();
    second.words.extend(line(&["1=", "YES"], 60.0, 60.0));
    second.words.extend(line(&["FA103", "Weight"], 42.0, 100.0));

    LayoutDocument {
        pages: vec![first, second],
    }
}

#[test]
fn old_format_segments_blocks_between_margin_names() {
    let patterns = ManualPatterns::new().expect("patterns");
    let manual = extract_old_format(
        &old_format_document(),
        &patterns,
        &LayoutThresholds::default(),
    );

    let names = manual
        .variables
        .iter()
        .map(|variable| variable.name.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(names, vec!["ID", "FA101", "FA102", "FA103"]);
    assert_eq!(manual.stats.column_offset, Some(2.0));
    assert_eq!(manual.total_observations, Some(812));

    assert_eq!(manual.variables[0].description, "Participant identifier");
    assert!(manual.variables[0].values.is_none());

    let prior_mi = &manual.variables[1];
    assert_eq!(prior_mi.description, "Has the subject had prior MI");
    let values = prior_mi.values.as_ref().expect("coded values");
    assert_eq!(values.get("1"), Some(&CodedValue::new("Yes", None)));
    assert_eq!(values.get("2"), Some(&CodedValue::new("No", None)));

    let chest_pain = &manual.variables[2];
    assert_eq!(chest_pain.description, "Chest pain");
    assert_eq!(
        chest_pain
            .values
            .as_ref()
            .and_then(|values| values.get("1"))
            .map(|value| value.description.as_str()),
        Some("YES")
    );

    assert_eq!(manual.variables[3].description, "Weight");
}
