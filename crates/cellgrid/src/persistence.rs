//! Sheet files
//!
//! A sheet is stored as a flat JSON object keyed by cell identifier:
//!
//! ```json
//! {
//!   "A1": { "value": "5", "formula": "" },
//!   "B1": { "value": 10, "formula": "=A1*2", "bold": true }
//! }
//! ```
//!
//! Only the raw input matters when loading: a non-empty `formula` is the
//! cell's input, otherwise the text of `value` is loaded as a literal, even
//! when it starts with `=`. Every other field is opaque and passed through
//! unchanged.

use crate::calculation::RecalcResult;
use crate::error::Result;
use crate::sheet::{CellExtra, SheetOptions, Spreadsheet};
use cellgrid_core::{CellId, CellValue};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One cell as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCell {
    /// Literal input, or the computed value of a formula
    #[serde(default)]
    pub value: Value,
    /// Formula text (empty for literals)
    #[serde(default)]
    pub formula: String,
    /// Formatting and other fields the engine does not interpret
    #[serde(flatten)]
    pub extra: CellExtra,
}

impl StoredCell {
    /// The raw input this entry rebuilds
    pub fn raw_input(&self) -> String {
        if !self.formula.is_empty() {
            return self.formula.clone();
        }
        match &self.value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// JSON form of a computed value
fn value_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        other => Value::String(other.to_string()),
    }
}

impl Spreadsheet {
    /// Snapshot every non-blank cell
    pub fn serialize(&self) -> BTreeMap<CellId, StoredCell> {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.raw_input().is_empty() || !cell.extra().is_empty())
            .map(|(id, cell)| {
                let stored = if cell.is_formula() {
                    StoredCell {
                        value: value_to_json(cell.value()),
                        formula: cell.raw_input().to_string(),
                        extra: cell.extra().clone(),
                    }
                } else {
                    StoredCell {
                        value: Value::String(cell.raw_input().to_string()),
                        formula: String::new(),
                        extra: cell.extra().clone(),
                    }
                };
                (*id, stored)
            })
            .collect()
    }

    /// Rebuild a spreadsheet from stored cells
    ///
    /// Every raw input is parsed again and all formulas are recalculated;
    /// stored computed values are ignored. Entries outside the grid are
    /// skipped.
    pub fn deserialize(cells: BTreeMap<CellId, StoredCell>, options: SheetOptions) -> Self {
        let mut sheet = Spreadsheet::with_options(options);
        sheet.load(cells);
        sheet
    }

    fn load(&mut self, cells: BTreeMap<CellId, StoredCell>) -> RecalcResult {
        let bounds = self.options.bounds;
        let count = cells.len();

        for (id, stored) in cells {
            if !bounds.contains(id) {
                warn!("Skipping {}: outside the {}x{} grid", id, bounds.rows, bounds.cols);
                continue;
            }
            if stored.formula.is_empty() {
                self.store_literal(id, &stored.raw_input());
            } else {
                self.load_input(id, &stored.formula);
            }
            if let Some(cell) = self.cells.get_mut(&id) {
                cell.extra = stored.extra;
            }
        }

        let result = self.recalculate_all();
        debug!(
            "Loaded {} cell(s), {} formula(s) recalculated",
            count,
            result.updated.len()
        );
        result
    }

    /// Serialize to a JSON string
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Load from a JSON string
    ///
    /// Keys that are not cell identifiers are skipped with a warning.
    pub fn from_json_str(json: &str, options: SheetOptions) -> Result<Self> {
        let raw: BTreeMap<String, StoredCell> = serde_json::from_str(json)?;

        let mut cells = BTreeMap::new();
        for (key, stored) in raw {
            match CellId::parse(&key) {
                Ok(id) => {
                    cells.insert(id, stored);
                }
                Err(e) => warn!("Skipping entry {:?}: {}", key, e),
            }
        }

        Ok(Self::deserialize(cells, options))
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Open a file
    pub fn open<P: AsRef<Path>>(path: P, options: SheetOptions) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json, options)
    }
}
