//! Delimited text parsing.
//!
//! A small comma-separated parser: the first non-blank line is the header,
//! double-quoted fields may contain commas, and `""` inside quotes is a
//! literal quote. It knows nothing about metrics.

/// One data line keyed by header name, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Exact column match, then case-insensitive.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .or_else(|| {
                let wanted = column.to_lowercase();
                self.fields.iter().find(|(name, _)| name.to_lowercase() == wanted)
            })
            .map(|(_, value)| value.as_str())
    }

    /// First column whose header contains `date`, case-insensitive.
    pub fn date_field(&self) -> Option<(&str, &str)> {
        self.fields
            .iter()
            .find(|(name, _)| name.to_lowercase().contains("date"))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Parse CSV text into records.
///
/// Blank lines are skipped. Cells past the header width are dropped and
/// missing trailing cells are simply absent from the record.
pub fn parse_csv(text: &str) -> Vec<Record> {
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers = parse_csv_line(header_line);

    lines
        .map(|line| {
            let cells = parse_csv_line(line);
            Record::new(headers.iter().cloned().zip(cells).collect())
        })
        .collect()
}

/// Split one line into fields, honouring double quotes.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => out.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    out.push(current);
    out
}
