use super::words::{PositionedWord, VariableNameEntry};

const NAME_TERMINATORS: [&str; 2] = ["Description:", "Page"];

pub fn locate_current_format_names(words: &[PositionedWord]) -> Vec<VariableNameEntry> {
    let mut names = Vec::new();

    for (index, pair) in words.windows(2).enumerate() {
        if pair[0].text != "Variable" || pair[1].text != "name:" {
            continue;
        }

        let name = words[index + 2..]
            .iter()
            .take_while(|word| !NAME_TERMINATORS.contains(&word.text.as_str()))
            .map(|word| word.text.as_str())
            .collect::<String>();

        names.push(VariableNameEntry::new(&name, pair[0].y_top));
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(tokens: &[&str], y_top: f64) -> Vec<PositionedWord> {
        tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let x = 50.0 + index as f64 * 40.0;
                PositionedWord::new(token, x, x + 35.0, y_top, y_top + 9.0)
            })
            .collect()
    }

    #[test]
    fn locates_names_in_page_order() {
        let mut words = line(&["Variable", "name:", "SEX"], 100.0);
        words.extend(line(&["Description:", "Participant", "sex"], 112.0));
        words.extend(line(&["Variable", "name:", "AGE1"], 300.0));
        words.extend(line(&["Description:", "Age"], 312.0));

        let names = locate_current_format_names(&words);
        assert_eq!(
            names,
            vec![
                VariableNameEntry::new("SEX", 100.0),
                VariableNameEntry::new("AGE1", 300.0),
            ]
        );
    }

    #[test]
    fn split_name_tokens_are_joined_without_separators() {
        let mut words = line(&["Variable", "name:", "HGT_", "CM"], 80.0);
        words.extend(line(&["Page", "3", "of", "9"], 760.0));

        let names = locate_current_format_names(&words);
        assert_eq!(names, vec![VariableNameEntry::new("HGT_CM", 80.0)]);
    }

    #[test]
    fn label_at_end_of_page_yields_empty_name_without_panicking() {
        let words = line(&["Variable", "name:"], 700.0);

        let names = locate_current_format_names(&words);
        assert_eq!(names, vec![VariableNameEntry::new("", 700.0)]);
    }

    #[test]
    fn ignores_variable_without_name_label() {
        let words = line(&["Variable", "notes:", "none"], 100.0);
        assert!(locate_current_format_names(&words).is_empty());
    }
}
