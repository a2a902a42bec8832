use super::patterns::ManualPatterns;
use super::words::PositionedWord;

pub fn parse_total_observations(
    first_page_words: &[PositionedWord],
    patterns: &ManualPatterns,
) -> Option<i64> {
    let text = first_page_words
        .iter()
        .map(|word| word.text.to_lowercase())
        .collect::<Vec<String>>()
        .join(" ");
    parse_total_observations_text(&text, patterns)
}

pub fn parse_total_observations_text(text: &str, patterns: &ManualPatterns) -> Option<i64> {
    let text = text.to_lowercase();
    [&patterns.observations, &patterns.unique_participants]
        .into_iter()
        .find_map(|pattern| {
            pattern
                .captures(&text)
                .and_then(|captures| captures.get(1))
                .and_then(|value| value.as_str().parse::<i64>().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> ManualPatterns {
        ManualPatterns::new().expect("patterns")
    }

    #[test]
    fn parses_observation_header() {
        assert_eq!(
            parse_total_observations_text("Dataset: ex1_7s  # Observations: 5209", &patterns()),
            Some(5209)
        );
    }

    #[test]
    fn parses_participant_sentence() {
        assert_eq!(
            parse_total_observations_text(
                "There are 3539 unique FHS participants in this dataset",
                &patterns()
            ),
            Some(3539)
        );
    }

    #[test]
    fn missing_phrases_yield_no_value() {
        assert_eq!(
            parse_total_observations_text("Coding manual for exam 8", &patterns()),
            None
        );
    }

    #[test]
    fn reads_first_page_words() {
        let words = ["#", "Observations:", "412"]
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let x = 20.0 * index as f64;
                PositionedWord::new(text, x, x + 15.0, 30.0, 38.0)
            })
            .collect::<Vec<PositionedWord>>();

        assert_eq!(parse_total_observations(&words, &patterns()), Some(412));
    }
}
