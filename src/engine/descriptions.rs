use super::dictionary::{MANUAL_REVIEW_SENTINEL, MISSING_DESCRIPTION_PLACEHOLDER};
use super::patterns::ManualPatterns;

const DESCRIPTION_LABEL: &str = "Description:";

pub fn split_descriptions(ocr_text: &str, patterns: &ManualPatterns) -> Vec<String> {
    ocr_text
        .split(DESCRIPTION_LABEL)
        .skip(1)
        .map(|section| {
            let section = patterns.page_marker.replace_all(section, "");
            let mut lines = Vec::<String>::new();

            for line in section.split('\n') {
                let line = line.trim();
                if ends_description(line, patterns) {
                    break;
                }
                if line.is_empty() {
                    continue;
                }
                lines.push(patterns.repeated_spaces.replace_all(line, " ").into_owned());
            }

            let description = lines.join(" ");
            if description.is_empty() || description.eq_ignore_ascii_case("units:") {
                MANUAL_REVIEW_SENTINEL.to_string()
            } else {
                description
            }
        })
        .collect()
}

fn ends_description(line: &str, patterns: &ManualPatterns) -> bool {
    line.contains("Description")
        || line.contains("Code or Value")
        || (patterns.upper_case_letter.is_match(line)
            && line == line.to_uppercase()
            && !line.contains(' '))
}

#[derive(Debug)]
pub struct DescriptionQueue {
    descriptions: std::vec::IntoIter<String>,
    exhausted: usize,
}

impl DescriptionQueue {
    pub fn new(descriptions: Vec<String>) -> Self {
        Self {
            descriptions: descriptions.into_iter(),
            exhausted: 0,
        }
    }

    pub fn next_description(&mut self) -> String {
        match self.descriptions.next() {
            Some(description) => description,
            None => {
                self.exhausted += 1;
                MISSING_DESCRIPTION_PLACEHOLDER.to_string()
            }
        }
    }

    pub fn exhausted(&self) -> usize {
        self.exhausted
    }

    pub fn remaining(&self) -> usize {
        self.descriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> ManualPatterns {
        ManualPatterns::new().expect("patterns")
    }

    #[test]
    fn splits_descriptions_at_labels_and_terminators() {
        let text = "Variable name: SEX\nDescription: Participant  sex as\nreported at exam 1\nCode or Value Description\n1 Male\n\
Variable name: AGE1\nDescription: Age at exam 1\nUnits: years\nAGE2\n";

        let descriptions = split_descriptions(text, &patterns());

        assert_eq!(
            descriptions,
            vec![
                "Participant sex as reported at exam 1".to_string(),
                "Age at exam 1 Units: years".to_string(),
            ]
        );
    }

    #[test]
    fn page_markers_are_removed() {
        let text = "Description: Systolic blood pressure Page 4 of 20\nsecond reading\n!!!PAGEBREAK!!!\nSBP2\n";

        let descriptions = split_descriptions(text, &patterns());

        assert_eq!(
            descriptions,
            vec!["Systolic blood pressure second reading".to_string()]
        );
    }

    #[test]
    fn empty_and_units_only_descriptions_need_review() {
        let text = "Description:\nCode or Value\nDescription: Units:\nHDL\n";

        let descriptions = split_descriptions(text, &patterns());

        assert_eq!(
            descriptions,
            vec![
                MANUAL_REVIEW_SENTINEL.to_string(),
                MANUAL_REVIEW_SENTINEL.to_string(),
            ]
        );
    }

    #[test]
    fn queue_substitutes_placeholder_when_exhausted() {
        let mut queue = DescriptionQueue::new(vec!["First".to_string()]);

        assert_eq!(queue.next_description(), "First");
        assert_eq!(queue.next_description(), MISSING_DESCRIPTION_PLACEHOLDER);
        assert_eq!(queue.exhausted(), 1);
        assert_eq!(queue.remaining(), 0);
    }
}
