//! Bulk edits over cell contents
//!
//! Both operations write plain literals, never formulas: a formula cell they
//! touch becomes a literal, and new text starting with `=` stays text.

use crate::calculation::RecalcResult;
use crate::error::Result;
use crate::sheet::{literal_value, Spreadsheet};
use cellgrid_core::{CellId, CellRange, CellValue, Error};
use log::debug;

impl Spreadsheet {
    /// Replace every occurrence of `find` in the text of each cell
    ///
    /// A literal cell is matched on its text as typed, numbers included, so
    /// replacing `4` with `5` turns `42` into `52`. A formula cell is matched
    /// only when its value is text. Only cells inside `range` are considered
    /// when one is given. An empty `find` matches nothing.
    pub fn find_replace(
        &mut self,
        range: Option<CellRange>,
        find: &str,
        replace: &str,
    ) -> Result<RecalcResult> {
        if let Some(range) = &range {
            self.check_range(range)?;
        }
        if find.is_empty() {
            return Ok(RecalcResult::default());
        }

        let mut edits: Vec<(CellId, String)> = self
            .cells
            .iter()
            .filter(|(id, _)| range.map_or(true, |r| r.contains(id)))
            .filter_map(|(id, cell)| {
                let text = if cell.is_formula() {
                    cell.value().as_str()?
                } else {
                    cell.raw_input()
                };
                text.contains(find)
                    .then(|| (*id, text.replace(find, replace)))
            })
            .collect();
        edits.sort_unstable_by_key(|(id, _)| *id);

        debug!("find_replace {:?} -> {:?}: {} cell(s)", find, replace, edits.len());
        Ok(self.apply_edits(edits))
    }

    /// Keep the first occurrence of each value in `range`
    ///
    /// The distinct values, in row-major order of first appearance, are
    /// packed into the front of the range and the remaining cells cleared.
    /// A blank cell counts as a value of its own. Only cells that exist are
    /// visited, so the cost follows the occupied cells, not the range size.
    pub fn remove_duplicates(&mut self, range: CellRange) -> Result<RecalcResult> {
        self.check_range(&range)?;

        let mut present: Vec<(u64, CellId)> = self
            .cells
            .keys()
            .filter_map(|id| range.position(id).map(|pos| (pos, *id)))
            .collect();
        present.sort_unstable();

        // Values are compared in the literal form they are written back as
        let mut unique: Vec<CellValue> = Vec::new();
        let mut note = |value: CellValue| {
            if !unique.contains(&value) {
                unique.push(value);
            }
        };

        let mut next = 0;
        for &(pos, id) in &present {
            if pos > next {
                // A cell that does not exist lies before this one
                note(CellValue::Empty);
            }
            note(literal_value(&self.get_cell_value(id).to_text()));
            next = pos + 1;
        }
        if next < range.cell_count() {
            note(CellValue::Empty);
        }

        let kept = unique.len() as u64;
        let mut edits: Vec<(CellId, String)> = range
            .cells()
            .zip(&unique)
            .map(|(id, value)| (id, value.to_text()))
            .collect();
        edits.extend(
            present
                .iter()
                .filter(|(pos, _)| *pos >= kept)
                .map(|(_, id)| (*id, String::new())),
        );

        debug!(
            "remove_duplicates {}: {} distinct value(s)",
            range,
            unique.len()
        );
        Ok(self.apply_edits(edits))
    }

    fn check_range(&self, range: &CellRange) -> Result<()> {
        if self.options.bounds.contains_range(range) {
            Ok(())
        } else {
            Err(Error::InvalidRange(format!("{} is outside the grid", range)).into())
        }
    }

    fn apply_edits(&mut self, edits: Vec<(CellId, String)>) -> RecalcResult {
        let mut changed = Vec::with_capacity(edits.len());
        for (id, text) in edits {
            // Blanking a cell that does not exist changes nothing
            if text.is_empty() && !self.cells.contains_key(&id) {
                continue;
            }
            self.store_literal(id, &text);
            changed.push(id);
        }

        if changed.is_empty() {
            return RecalcResult::default();
        }
        self.recalculate_from(&changed)
    }
}
