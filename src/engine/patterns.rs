use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug)]
pub struct ManualPatterns {
    pub(crate) range_code: Regex,
    pub(crate) single_code: Regex,
    pub(crate) dash_variants: Regex,
    pub(crate) page_marker: Regex,
    pub(crate) upper_case_letter: Regex,
    pub(crate) repeated_spaces: Regex,
    pub(crate) observations: Regex,
    pub(crate) unique_participants: Regex,
}

impl ManualPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            range_code: Regex::new(r"^(\d{1,4}-\d{1,4})[\s=]")
                .context("failed to compile range code regex")?,
            single_code: Regex::new(r"^(\d{1,4})[\s=]")
                .context("failed to compile single code regex")?,
            dash_variants: Regex::new(r"[-‐‑‒–—]").context("failed to compile dash regex")?,
            page_marker: Regex::new(r"Page \d+ of \d+")
                .context("failed to compile page marker regex")?,
            upper_case_letter: Regex::new(r"[A-Z]")
                .context("failed to compile upper-case letter regex")?,
            repeated_spaces: Regex::new(r" {2,}")
                .context("failed to compile repeated space regex")?,
            observations: Regex::new(r"# observations: (\d+)")
                .context("failed to compile observations regex")?,
            unique_participants: Regex::new(r"there are (\d+) unique fhs participants")
                .context("failed to compile participants regex")?,
        })
    }

    pub fn leading_code<'a>(&self, line: &'a str) -> Option<&'a str> {
        let line = line.trim_start();
        self.range_code
            .captures(line)
            .or_else(|| self.single_code.captures(line))
            .and_then(|captures| captures.get(1))
            .map(|code| code.as_str())
    }

    pub fn normalize_dashes(&self, text: &str) -> String {
        self.dash_variants.replace_all(text, "-").into_owned()
    }
}
