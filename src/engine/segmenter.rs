use super::patterns::ManualPatterns;
use super::table_cells::{CodedValue, CodedValueTable};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentState {
    Seeking,
    InDescription,
    InCodedValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedText {
    pub description: String,
    pub values: Option<CodedValueTable>,
}

/// Splits the text block of one old-format variable.
///
/// The first non-blank line carries the variable name followed by the start
/// of the description. Following lines extend the description until the
/// first coded-value line; from there each coded-value line opens a code and
/// upper-case lines continue the open code's label. Old-format manuals never
/// print counts.
pub fn segment_variable_text(text: &str, patterns: &ManualPatterns) -> SegmentedText {
    let normalized = patterns.normalize_dashes(text);

    let mut state = SegmentState::Seeking;
    let mut description = Vec::<String>::new();
    let mut values = CodedValueTable::new();

    for raw_line in normalized.split('\n') {
        let line = raw_line.trim();

        state = match state {
            SegmentState::Seeking => {
                if line.is_empty() {
                    SegmentState::Seeking
                } else {
                    let remainder = line
                        .split_once(char::is_whitespace)
                        .map(|(_, rest)| rest.trim())
                        .unwrap_or_default();
                    if !remainder.is_empty() {
                        description.push(remainder.to_string());
                    }
                    SegmentState::InDescription
                }
            }
            SegmentState::InDescription => match patterns.leading_code(line) {
                Some(code) => open_code(&mut values, code, line),
                None => {
                    if !line.is_empty() {
                        description.push(line.to_string());
                    }
                    SegmentState::InDescription
                }
            },
            SegmentState::InCodedValue(current) => match patterns.leading_code(line) {
                Some(code) => open_code(&mut values, code, line),
                None => {
                    if is_label_continuation(line)
                        && let Some(open) = values.get_mut(&current)
                    {
                        if !open.description.is_empty() {
                            open.description.push(' ');
                        }
                        open.description.push_str(line);
                    }
                    SegmentState::InCodedValue(current)
                }
            },
        };
    }

    SegmentedText {
        description: description.join(" "),
        values: if values.is_empty() {
            None
        } else {
            Some(values)
        },
    }
}

fn open_code(values: &mut CodedValueTable, code: &str, line: &str) -> SegmentState {
    let label = line
        .trim_start()
        .strip_prefix(code)
        .unwrap_or(line)
        .trim()
        .trim_start_matches('=')
        .trim();
    values.insert(code, CodedValue::new(label, None));
    SegmentState::InCodedValue(code.to_string())
}

fn is_label_continuation(line: &str) -> bool {
    !line.is_empty() && line == line.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> ManualPatterns {
        ManualPatterns::new().expect("patterns")
    }

    #[test]
    fn segments_description_and_coded_values() {
        let segmented = segment_variable_text(
            "FA101 Has the subject had prior MI\n1= Yes\n2= No",
            &patterns(),
        );

        assert_eq!(segmented.description, "Has the subject had prior MI");
        let values = segmented.values.expect("coded values");
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("1"), Some(&CodedValue::new("Yes", None)));
        assert_eq!(values.get("2"), Some(&CodedValue::new("No", None)));
    }

    #[test]
    fn description_spans_lines_until_first_leading_code() {
        let text = "FA120 Age at onset of\nangina in years, 2 visits\n0-120 = AGE IN YEARS\n999 UNKNOWN";
        let segmented = segment_variable_text(text, &patterns());

        assert_eq!(
            segmented.description,
            "Age at onset of angina in years, 2 visits"
        );
        let values = segmented.values.expect("coded values");
        assert_eq!(
            values.codes().collect::<Vec<&str>>(),
            vec!["0-120", "999"]
        );
        assert_eq!(
            values.get("999").map(|value| value.description.as_str()),
            Some("UNKNOWN")
        );
    }

    #[test]
    fn ranges_with_typographic_dashes_are_normalized() {
        let segmented = segment_variable_text("FA130 Visit\n88–89= NOT DONE", &patterns());
        let values = segmented.values.expect("coded values");
        assert_eq!(
            values.get("88-89").map(|value| value.description.as_str()),
            Some("NOT DONE")
        );
    }

    #[test]
    fn upper_case_lines_continue_the_open_code() {
        let text = "FA140 Cause\n1= DEFINITE\nMYOCARDIAL INFARCTION\nsee exam notes\n2= NONE";
        let segmented = segment_variable_text(text, &patterns());
        let values = segmented.values.expect("coded values");

        assert_eq!(
            values.get("1").map(|value| value.description.as_str()),
            Some("DEFINITE MYOCARDIAL INFARCTION")
        );
        assert_eq!(
            values.get("2").map(|value| value.description.as_str()),
            Some("NONE")
        );
    }

    #[test]
    fn numbers_inside_names_and_sentences_are_not_codes() {
        let text = "FA150 Number of cigarettes\nsmoked per day, 20 or more\nFA151 is related";
        let segmented = segment_variable_text(text, &patterns());

        assert!(segmented.values.is_none());
        assert_eq!(
            segmented.description,
            "Number of cigarettes smoked per day, 20 or more FA151 is related"
        );
    }

    #[test]
    fn leading_blank_lines_are_skipped() {
        let segmented = segment_variable_text("\n\nFA160\n1 YES", &patterns());

        assert_eq!(segmented.description, "");
        assert_eq!(
            segmented
                .values
                .and_then(|values| values.get("1").map(|value| value.description.clone())),
            Some("YES".to_string())
        );
    }
}
