use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One row of a bulk kafalat payment sheet, fields still raw.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct PaymentRow {
    #[serde(rename = "Worker ID")]
    pub(crate) worker: String,
    #[serde(rename = "Month")]
    pub(crate) month: String,
    #[serde(rename = "Amount", default, deserialize_with = "empty_string_as_none")]
    pub(crate) amount: Option<String>,
    #[serde(rename = "Exempt", default, deserialize_with = "empty_string_as_none")]
    pub(crate) exempt: Option<String>,
    #[serde(rename = "Reference", default, deserialize_with = "empty_string_as_none")]
    pub(crate) reference: Option<String>,
    #[serde(rename = "Notes", default, deserialize_with = "empty_string_as_none")]
    pub(crate) notes: Option<String>,
    #[serde(rename = "Date", default, deserialize_with = "empty_string_as_none")]
    pub(crate) date: Option<String>,
    /// Line in the sheet where the row starts, header included.
    #[serde(skip)]
    pub(crate) line: u64,
}

impl PaymentRow {
    pub(crate) fn is_exempt(&self) -> bool {
        self.exempt
            .as_deref()
            .map(|flag| {
                matches!(
                    flag.trim().to_ascii_lowercase().as_str(),
                    "yes" | "y" | "true" | "1"
                )
            })
            .unwrap_or(false)
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<PaymentRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut row: PaymentRow = record.deserialize(Some(&headers))?;
        row.line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();
        rows.push(row);
    }
    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
