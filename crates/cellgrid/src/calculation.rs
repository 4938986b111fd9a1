//! Recalculation passes
//!
//! An edit recalculates the edited cell and its transitive dependents,
//! nothing else. The affected cells are ordered so that each one is
//! evaluated after all of its precedents; reference cycles are found as
//! strongly connected groups and every member is set to `#CIRCULAR!`
//! without being evaluated.
//!
//! # Example
//!
//! ```rust
//! use cellgrid::{CellValue, ErrorValue, Spreadsheet};
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.set("A1", "=B1").unwrap();
//! sheet.set("B1", "=A1").unwrap();
//!
//! assert_eq!(sheet.value("A1").unwrap(), CellValue::Error(ErrorValue::Circular));
//! assert_eq!(sheet.value("B1").unwrap(), CellValue::Error(ErrorValue::Circular));
//! ```

use crate::sheet::Spreadsheet;
use cellgrid_core::{CellId, CellValue, ErrorValue};
use cellgrid_formula::{evaluate, EvaluationContext, RecalcStep};
use log::{debug, trace};
use std::collections::BTreeMap;

/// Outcome of a recalculation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecalcResult {
    /// Cells recalculated, in evaluation order
    pub updated: Vec<CellId>,
    /// New value of every updated cell
    pub values: BTreeMap<CellId, CellValue>,
    /// Reference cycles found during the pass
    pub cycles: Vec<Vec<CellId>>,
}

impl RecalcResult {
    fn record(&mut self, id: CellId, value: CellValue) {
        self.updated.push(id);
        self.values.insert(id, value);
    }
}

impl Spreadsheet {
    /// Recalculate every formula in the grid
    pub fn recalculate_all(&mut self) -> RecalcResult {
        let formula_cells: Vec<CellId> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.formula().is_some())
            .map(|(id, _)| *id)
            .collect();

        self.run_pass(&formula_cells)
    }

    /// Recalculate the given cells and everything that depends on them
    pub(crate) fn recalculate_from(&mut self, changed: &[CellId]) -> RecalcResult {
        let affected = self.graph.affected_cells(changed);
        self.run_pass(&affected)
    }

    fn run_pass(&mut self, cells: &[CellId]) -> RecalcResult {
        let plan = self.graph.recalc_plan(cells);
        let mut result = RecalcResult::default();

        for step in plan {
            match step {
                RecalcStep::Evaluate(id) => {
                    let Some(value) = self.evaluate_cell(id) else {
                        continue;
                    };
                    if self.store_value(id, value.clone()) {
                        result.record(id, value);
                    }
                }
                RecalcStep::Circular(members) => {
                    debug!(
                        "Circular reference among {}",
                        members
                            .iter()
                            .map(CellId::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    let value = CellValue::Error(ErrorValue::Circular);
                    for &id in &members {
                        if self.store_value(id, value.clone()) {
                            result.record(id, value.clone());
                        }
                    }
                    result.cycles.push(members);
                }
            }
        }

        trace!(
            "Recalculated {} cell(s) ({} requested)",
            result.updated.len(),
            cells.len()
        );
        result
    }

    /// Compute a cell's value from its formula, or keep its literal value
    ///
    /// Returns `None` for cells that do not exist.
    fn evaluate_cell(&self, id: CellId) -> Option<CellValue> {
        let cell = self.cells.get(&id)?;
        let Some(ast) = cell.formula() else {
            return Some(cell.value().clone());
        };

        let ctx = EvaluationContext::new(self, &self.functions);
        Some(match evaluate(ast, &ctx) {
            Ok(value) => value.into(),
            Err(e) => {
                debug!("{}: {}", id, e);
                CellValue::Error(e.error_value())
            }
        })
    }
}
