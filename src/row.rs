use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a row, derived from its generation index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(pub String);

impl RowKey {
    pub fn from_index(index: usize) -> Self {
        RowKey(index.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey(value.to_string())
    }
}

/// One record of the water quality table.
///
/// Every attribute is kept as text, exactly as it is shown and exported.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub key: RowKey,
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

/// A table column, named after the field it displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    Substance,
    Unit,
    Year,
    Mcl,
    Mclg,
    AmountDetected,
    Range,
    Violation,
    TypicalSource,
}

/// Columns shown on the page, in display order.
pub const DISPLAY_COLUMNS: [Column; 8] = [
    Column::Substance,
    Column::Year,
    Column::Mcl,
    Column::Mclg,
    Column::AmountDetected,
    Column::Range,
    Column::Violation,
    Column::TypicalSource,
];

impl Column {
    pub fn title(self) -> &'static str {
        match self {
            Column::Substance => "Substance",
            Column::Unit => "Unit",
            Column::Year => "Year Sampled",
            Column::Mcl => "MCL [MRDL]",
            Column::Mclg => "MCLG [MRDLG]",
            Column::AmountDetected => "Amount Detected",
            Column::Range => "Range (Low-High)",
            Column::Violation => "Violation",
            Column::TypicalSource => "Typical Source",
        }
    }

    /// Wire name of the field, as used by the page and the export payload.
    pub fn data_index(self) -> &'static str {
        match self {
            Column::Substance => "substance",
            Column::Unit => "unit",
            Column::Year => "year",
            Column::Mcl => "mcl",
            Column::Mclg => "mclg",
            Column::AmountDetected => "amountDetected",
            Column::Range => "range",
            Column::Violation => "violation",
            Column::TypicalSource => "typicalSource",
        }
    }

    pub fn is_editable(self) -> bool {
        !matches!(self, Column::Substance)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.data_index())
    }
}

impl Row {
    pub fn value(&self, column: Column) -> &str {
        match column {
            Column::Substance => &self.substance,
            Column::Unit => &self.unit,
            Column::Year => &self.year,
            Column::Mcl => &self.mcl,
            Column::Mclg => &self.mclg,
            Column::AmountDetected => &self.amount_detected,
            Column::Range => &self.range,
            Column::Violation => &self.violation,
            Column::TypicalSource => &self.typical_source,
        }
    }

    /// Shallow merge: every field set in `patch` replaces the current one.
    pub fn merged(&self, patch: &RowPatch) -> Row {
        let pick = |edited: &Option<String>, current: &String| {
            edited.clone().unwrap_or_else(|| current.clone())
        };

        Row {
            key: self.key.clone(),
            substance: self.substance.clone(),
            unit: pick(&patch.unit, &self.unit),
            year: pick(&patch.year, &self.year),
            mcl: pick(&patch.mcl, &self.mcl),
            mclg: pick(&patch.mclg, &self.mclg),
            amount_detected: pick(&patch.amount_detected, &self.amount_detected),
            range: pick(&patch.range, &self.range),
            violation: pick(&patch.violation, &self.violation),
            typical_source: pick(&patch.typical_source, &self.typical_source),
        }
    }
}

/// Partial row used by the edit path. There is no substance field.
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mclg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_detected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_source: Option<String>,
}

impl RowPatch {
    /// Patch touching a single column. Returns `None` for the substance column.
    pub fn single(column: Column, value: impl Into<String>) -> Option<Self> {
        let mut patch = RowPatch::default();
        let value = Some(value.into());
        match column {
            Column::Substance => return None,
            Column::Unit => patch.unit = value,
            Column::Year => patch.year = value,
            Column::Mcl => patch.mcl = value,
            Column::Mclg => patch.mclg = value,
            Column::AmountDetected => patch.amount_detected = value,
            Column::Range => patch.range = value,
            Column::Violation => patch.violation = value,
            Column::TypicalSource => patch.typical_source = value,
        }
        Some(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == RowPatch::default()
    }
}
