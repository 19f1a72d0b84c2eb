use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::row::Row;

lazy_static! {
    static ref RECORD_CREATED_REGEX: Regex = Regex::new(r"Record Created : (\d+)").unwrap();
}

/// Identifier the document service assigns to a saved table.
///
/// Kept as the digits the service sent, whatever their length.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Request body for the document service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub doc: Vec<ExportDocument>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub id: String,
    pub rowdata: Vec<ExportRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: String,
    pub substance: String,
    pub unit: String,
    pub year: String,
    pub mcl: String,
    pub mclg: String,
    pub amount_detected: String,
    pub range: String,
    pub violation: String,
    pub typical_source: String,
}

impl ExportPayload {
    /// Renumber the rows by position (starting at 1) and drop their keys.
    pub fn from_rows(rows: &[Row]) -> Self {
        let rowdata = rows
            .iter()
            .enumerate()
            .map(|(index, row)| ExportRow {
                id: (index + 1).to_string(),
                substance: row.substance.clone(),
                unit: row.unit.clone(),
                year: row.year.clone(),
                mcl: row.mcl.clone(),
                mclg: row.mclg.clone(),
                amount_detected: row.amount_detected.clone(),
                range: row.range.clone(),
                violation: row.violation.clone(),
                typical_source: row.typical_source.clone(),
            })
            .collect();

        ExportPayload {
            doc: vec![ExportDocument {
                id: String::new(),
                rowdata,
            }],
        }
    }

    pub fn row_count(&self) -> usize {
        self.doc.iter().map(|d| d.rowdata.len()).sum()
    }
}

/// Find `Record Created : <digits>` in a create response.
pub fn extract_record_id(body: &str) -> Option<RecordId> {
    let captures = RECORD_CREATED_REGEX.captures(body)?;
    captures.get(1).map(|digits| RecordId::from(digits.as_str()))
}
