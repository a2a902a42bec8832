use serde::ser::{Serialize, SerializeMap, Serializer};

const STRING_CODES: [&str; 2] = ["Blank", "Not blank"];
const RANGE_DASHES: [char; 3] = ['-', '–', '—'];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CodedValue {
    pub description: String,
    pub count: Option<i64>,
}

impl CodedValue {
    pub fn new(description: &str, count: Option<i64>) -> Self {
        Self {
            description: description.to_string(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    CodeDescription,
    CodeDescriptionCount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodedValueTable {
    entries: Vec<(String, CodedValue)>,
}

impl CodedValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: &str, value: CodedValue) {
        if let Some(existing) = self.get_mut(code) {
            *existing = value;
            return;
        }
        self.entries.push((code.to_string(), value));
    }

    #[cfg(test)]
    pub fn get(&self, code: &str) -> Option<&CodedValue> {
        self.entries
            .iter()
            .find(|(known, _)| known == code)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut CodedValue> {
        self.entries
            .iter_mut()
            .find(|(known, _)| known == code)
            .map(|(_, value)| value)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodedValue)> {
        self.entries
            .iter()
            .map(|(code, value)| (code.as_str(), value))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }

    pub fn has_description(&self, description: &str) -> bool {
        self.entries
            .iter()
            .any(|(_, value)| value.description == description)
    }

    pub fn shape(&self) -> TableShape {
        if !self.entries.is_empty() && self.entries.iter().all(|(_, value)| value.count.is_some())
        {
            TableShape::CodeDescriptionCount
        } else {
            TableShape::CodeDescription
        }
    }

    pub fn merge_from(&mut self, other: CodedValueTable) {
        for (code, value) in other.entries {
            self.insert(&code, value);
        }
    }
}

impl Serialize for CodedValueTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, value) in &self.entries {
            map.serialize_entry(code, value)?;
        }
        map.end()
    }
}

/// Whether a cell can sit in the code column of a coded-value table.
pub fn is_code_fragment(fragment: &str) -> bool {
    if STRING_CODES.contains(&fragment) {
        return true;
    }
    if fragment != fragment.to_uppercase() {
        return false;
    }

    let has_range_dash = fragment.contains(RANGE_DASHES);
    if fragment.chars().count() >= 2 && !has_range_dash {
        return fragment.trim().parse::<f64>().is_ok();
    }

    true
}

pub fn classify_table_cells(fragments: &[String]) -> Option<CodedValueTable> {
    let num_rows = fragments
        .iter()
        .take_while(|fragment| is_code_fragment(fragment))
        .count();
    if num_rows == 0 {
        return None;
    }

    let shape = if fragments.len() == 2 * num_rows {
        TableShape::CodeDescription
    } else if fragments.len() == 3 * num_rows {
        TableShape::CodeDescriptionCount
    } else {
        return None;
    };

    let mut table = CodedValueTable::new();
    for row in 0..num_rows {
        let code = &fragments[row];
        let description = &fragments[num_rows + row];
        let count = match shape {
            TableShape::CodeDescription => None,
            TableShape::CodeDescriptionCount => Some(parse_count(&fragments[2 * num_rows + row])?),
        };
        table.insert(code, CodedValue::new(description, count));
    }

    Some(table)
}

fn parse_count(cell: &str) -> Option<i64> {
    cell.chars()
        .filter(|character| *character != ',' && !character.is_whitespace())
        .collect::<String>()
        .parse::<i64>()
        .ok()
}
