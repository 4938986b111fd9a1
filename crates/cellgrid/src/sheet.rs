//! The spreadsheet engine: cells, their formulas and the dependency graph

use crate::calculation::RecalcResult;
use crate::error::Result;
use ahash::AHashMap;
use cellgrid_core::{CellId, CellRange, CellValue, ErrorValue, GridBounds};
use cellgrid_formula::{
    parse_formula_with, CellSource, DependencyGraph, FormulaExpr, FunctionDef, FunctionRegistry,
    Precedent,
};
use lazy_regex::regex_is_match;
use log::debug;
use std::collections::BTreeSet;

/// Opaque per-cell metadata (formatting and the like), passed through unchanged
pub type CellExtra = serde_json::Map<String, serde_json::Value>;

/// Options for a spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetOptions {
    /// Size of the grid
    pub bounds: GridBounds,
}

impl SheetOptions {
    /// Options for a `rows` x `cols` grid
    pub fn with_bounds(rows: u32, cols: u32) -> Self {
        Self {
            bounds: GridBounds::new(rows, cols),
        }
    }
}

/// A single cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    raw_input: String,
    entered_as_formula: bool,
    formula: Option<FormulaExpr>,
    value: CellValue,
    pub(crate) extra: CellExtra,
}

impl Cell {
    /// The text as typed, or the literal text a bulk edit left behind
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// The parsed formula, if the input is a formula that parsed
    pub fn formula(&self) -> Option<&FormulaExpr> {
        self.formula.as_ref()
    }

    /// Check if the cell holds a formula (parsed or not)
    ///
    /// A literal may still start with `=` when a bulk edit wrote it.
    pub fn is_formula(&self) -> bool {
        self.entered_as_formula
    }

    /// The computed value
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Opaque metadata
    pub fn extra(&self) -> &CellExtra {
        &self.extra
    }
}

/// Value of a non-formula input
///
/// Text that lexically matches a numeric literal is a number and an error
/// sentinel such as `#DIV0!` is that error; anything else stays text.
pub fn literal_value(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }
    if let Some(e) = ErrorValue::from_str(raw) {
        return CellValue::Error(e);
    }
    if regex_is_match!(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$", raw) {
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }
    }
    CellValue::string(raw)
}

/// A grid of cells with incremental, dependency-driven recalculation
///
/// Every mutation runs to completion, recalculating exactly the cells that
/// depend on what changed, before it returns.
///
/// # Example
///
/// ```rust
/// use cellgrid::{CellValue, Spreadsheet};
///
/// let mut sheet = Spreadsheet::new();
/// sheet.set("A1", "5").unwrap();
/// sheet.set("B1", "=A1*2").unwrap();
/// assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(10.0));
///
/// let result = sheet.set("A1", "10").unwrap();
/// assert_eq!(result.values.len(), 2);
/// assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(20.0));
/// ```
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    pub(crate) cells: AHashMap<CellId, Cell>,
    pub(crate) graph: DependencyGraph,
    pub(crate) functions: FunctionRegistry,
    pub(crate) options: SheetOptions,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Spreadsheet {
    /// Create an empty spreadsheet with default options
    pub fn new() -> Self {
        Self::with_options(SheetOptions::default())
    }

    /// Create an empty spreadsheet
    pub fn with_options(options: SheetOptions) -> Self {
        Self {
            cells: AHashMap::new(),
            graph: DependencyGraph::new(),
            functions: FunctionRegistry::builtin().clone(),
            options,
        }
    }

    /// The spreadsheet options
    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// Grid bounds
    pub fn bounds(&self) -> GridBounds {
        self.options.bounds
    }

    /// Functions available to formulas
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Number of cells that exist
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if no cell exists
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get a cell
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Identifiers of all existing cells, row-major
    pub fn cell_ids(&self) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self.cells.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    // === Mutation ===

    /// Set a cell's input and recalculate everything that depends on it
    ///
    /// Input starting with `=` is a formula. A formula that does not parse
    /// leaves the cell without precedents and with the value `#ERROR!`.
    pub fn set_cell_input(&mut self, id: CellId, raw: &str) -> Result<RecalcResult> {
        self.options.bounds.check(id)?;
        self.load_input(id, raw);
        Ok(self.recalculate_from(&[id]))
    }

    /// [`Spreadsheet::set_cell_input`] with a textual cell address
    pub fn set(&mut self, address: &str, raw: &str) -> Result<RecalcResult> {
        let id = CellId::parse(address)?;
        self.set_cell_input(id, raw)
    }

    /// Reset a cell to empty, keeping its metadata
    pub fn clear_cell(&mut self, id: CellId) -> Result<RecalcResult> {
        self.set_cell_input(id, "")
    }

    /// Remove a cell from the grid and the dependency graph
    ///
    /// Formulas that read the cell stay in place and now see it as empty.
    pub fn remove_cell(&mut self, id: CellId) -> RecalcResult {
        self.graph.clear_precedents(id);
        if self.cells.remove(&id).is_none() {
            return RecalcResult::default();
        }
        self.recalculate_from(&[id])
    }

    /// Change the grid size
    ///
    /// Cells outside the new bounds are removed and every formula is
    /// recalculated, so references past the edge now read `#REF!`.
    pub fn resize(&mut self, bounds: GridBounds) -> RecalcResult {
        self.options.bounds = bounds;

        let outside: Vec<CellId> = self
            .cells
            .keys()
            .filter(|id| !bounds.contains(**id))
            .copied()
            .collect();
        for id in outside {
            self.graph.clear_precedents(id);
            self.cells.remove(&id);
        }

        self.recalculate_all()
    }

    /// Replace a cell's opaque metadata, creating the cell if needed
    pub fn set_cell_extra(&mut self, id: CellId, extra: CellExtra) -> Result<()> {
        self.options.bounds.check(id)?;
        self.cells.entry(id).or_default().extra = extra;
        Ok(())
    }

    /// Make a function available to formulas
    ///
    /// Existing formulas are recalculated, so cells that called the
    /// function before it was known pick it up.
    pub fn register_function(&mut self, def: FunctionDef) -> RecalcResult {
        self.functions.register(def);
        self.recalculate_all()
    }

    /// Store a cell's input without recalculating
    ///
    /// The cell's precedent edges are replaced before anything is evaluated.
    pub(crate) fn load_input(&mut self, id: CellId, raw: &str) {
        if !raw.starts_with('=') {
            self.store_literal(id, raw);
            return;
        }

        let (formula, value) = match parse_formula_with(raw, &self.functions) {
            Ok(ast) => (Some(ast), CellValue::Empty),
            Err(e) => {
                debug!("{}: {}", id, e);
                (None, CellValue::Error(ErrorValue::Error))
            }
        };

        match &formula {
            Some(ast) => {
                let precedents = ast.precedents();
                // Single-cell references come into existence when first read
                for precedent in &precedents {
                    if let Precedent::Cell(target) = precedent {
                        if self.options.bounds.contains(*target) {
                            self.cells.entry(*target).or_default();
                        }
                    }
                }
                self.graph.set_precedents(id, precedents);
            }
            None => self.graph.clear_precedents(id),
        }

        let cell = self.cells.entry(id).or_default();
        cell.raw_input = raw.to_string();
        cell.entered_as_formula = true;
        cell.formula = formula;
        cell.value = value;
    }

    /// Store literal text without recalculating
    ///
    /// The text is never parsed as a formula, even when it starts with `=`.
    pub(crate) fn store_literal(&mut self, id: CellId, text: &str) {
        self.graph.clear_precedents(id);

        let cell = self.cells.entry(id).or_default();
        cell.raw_input = text.to_string();
        cell.entered_as_formula = false;
        cell.formula = None;
        cell.value = literal_value(text);
    }

    /// Store a computed value on an existing cell
    pub(crate) fn store_value(&mut self, id: CellId, value: CellValue) -> bool {
        match self.cells.get_mut(&id) {
            Some(cell) => {
                cell.value = value;
                true
            }
            None => false,
        }
    }

    // === Queries ===

    /// Get a cell's computed value (`Empty` if the cell does not exist)
    pub fn get_cell_value(&self, id: CellId) -> CellValue {
        self.cells
            .get(&id)
            .map(|cell| cell.value.clone())
            .unwrap_or_default()
    }

    /// [`Spreadsheet::get_cell_value`] with a textual cell address
    pub fn value(&self, address: &str) -> Result<CellValue> {
        Ok(self.get_cell_value(CellId::parse(address)?))
    }

    /// Get the cells a cell's formula reads
    ///
    /// A range contributes the cells inside it that exist, so a whole-column
    /// range costs no more than the grid's occupied cells. References outside
    /// the grid are left out. See [`Spreadsheet::get_precedent_refs`] for the
    /// ranges themselves.
    pub fn get_cell_precedents(&self, id: CellId) -> BTreeSet<CellId> {
        let mut cells = BTreeSet::new();
        for precedent in self.graph.get_precedents(id) {
            match precedent {
                Precedent::Cell(cell) => {
                    if self.options.bounds.contains(cell) {
                        cells.insert(cell);
                    }
                }
                Precedent::Range(range) => {
                    cells.extend(self.cells.keys().filter(|c| range.contains(c)).copied());
                }
            }
        }
        cells
    }

    /// Get the cells and ranges a cell's formula reads, unexpanded
    pub fn get_precedent_refs(&self, id: CellId) -> Vec<Precedent> {
        self.graph.get_precedents(id)
    }

    /// Get the formula cells that read a cell directly
    pub fn get_cell_dependents(&self, id: CellId) -> Vec<CellId> {
        self.graph.get_dependents(id)
    }
}

impl CellSource for Spreadsheet {
    fn cell_value(&self, id: CellId) -> CellValue {
        self.get_cell_value(id)
    }

    fn bounds(&self) -> GridBounds {
        self.options.bounds
    }

    fn range_values(&self, range: &CellRange) -> Vec<CellValue> {
        // Sparse grids: walk the cells that exist instead of the whole range
        if range.cell_count() > self.cells.len() as u64 {
            let mut present: Vec<(&CellId, &Cell)> = self
                .cells
                .iter()
                .filter(|(id, _)| range.contains(id))
                .collect();
            present.sort_unstable_by_key(|(id, _)| **id);
            return present
                .into_iter()
                .map(|(_, cell)| cell.value.clone())
                .collect();
        }

        range.cells().map(|id| self.get_cell_value(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(text: &str) -> CellId {
        CellId::parse(text).unwrap()
    }

    #[test]
    fn test_literal_value() {
        assert_eq!(literal_value(""), CellValue::Empty);
        assert_eq!(literal_value("42"), CellValue::Number(42.0));
        assert_eq!(literal_value("-3.5"), CellValue::Number(-3.5));
        assert_eq!(literal_value(".5"), CellValue::Number(0.5));
        assert_eq!(literal_value("1e3"), CellValue::Number(1000.0));
        assert_eq!(literal_value("12abc"), CellValue::string("12abc"));
        assert_eq!(literal_value(" 7"), CellValue::string(" 7"));
        assert_eq!(literal_value("inf"), CellValue::string("inf"));
        assert_eq!(literal_value("1e999"), CellValue::string("1e999"));
        assert_eq!(literal_value("#DIV0!"), CellValue::Error(ErrorValue::Div0));
        assert_eq!(literal_value("#div0!"), CellValue::string("#div0!"));
    }

    #[test]
    fn test_set_and_get() {
        let mut sheet = Spreadsheet::new();
        sheet.set("A1", "hello").unwrap();
        sheet.set("A2", "12").unwrap();

        assert_eq!(sheet.value("A1").unwrap(), CellValue::string("hello"));
        assert_eq!(sheet.value("A2").unwrap(), CellValue::Number(12.0));
        assert_eq!(sheet.value("A3").unwrap(), CellValue::Empty);
        assert_eq!(sheet.cell(cell("A2")).unwrap().raw_input(), "12");
    }

    #[test]
    fn test_references_create_cells() {
        let mut sheet = Spreadsheet::new();
        sheet.set("C1", "=A1+SUM(B1:B3)").unwrap();

        assert!(sheet.cell(cell("A1")).is_some());
        // Ranges do not create their cells
        assert!(sheet.cell(cell("B2")).is_none());
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn test_write_out_of_bounds() {
        let mut sheet = Spreadsheet::with_options(SheetOptions::with_bounds(10, 3));
        assert!(sheet.set("D1", "1").is_err());
        assert!(sheet.set("A11", "1").is_err());
        assert!(sheet.set("C10", "1").is_ok());
        assert!(sheet.set("a1", "1").is_err());
    }

    #[test]
    fn test_parse_failure_is_error_value() {
        let mut sheet = Spreadsheet::new();
        sheet.set("A1", "=1+").unwrap();

        let a1 = sheet.cell(cell("A1")).unwrap();
        assert_eq!(a1.value(), &CellValue::Error(ErrorValue::Error));
        assert!(a1.is_formula());
        assert!(a1.formula().is_none());
    }

    #[test]
    fn test_precedents_and_dependents() {
        let mut sheet = Spreadsheet::new();
        sheet.set("B2", "4").unwrap();
        sheet.set("C1", "=A1+SUM(B1:B2)").unwrap();
        sheet.set("D1", "=A1").unwrap();

        // B1 does not exist, so the range only contributes B2
        assert_eq!(
            sheet.get_cell_precedents(cell("C1")),
            BTreeSet::from([cell("A1"), cell("B2")])
        );
        assert_eq!(sheet.get_cell_dependents(cell("A1")), vec![cell("C1"), cell("D1")]);
        assert_eq!(sheet.get_cell_dependents(cell("B2")), vec![cell("C1")]);

        // Rewriting a formula replaces its precedents
        sheet.set("C1", "=5").unwrap();
        assert!(sheet.get_cell_precedents(cell("C1")).is_empty());
        assert_eq!(sheet.get_cell_dependents(cell("A1")), vec![cell("D1")]);
    }

    #[test]
    fn test_precedents_of_whole_grid_range() {
        let mut sheet = Spreadsheet::new();
        sheet.set("B1", "1").unwrap();
        sheet.set("C7", "2").unwrap();
        sheet.set("A1", "=SUM(B1:XFD1048576)").unwrap();

        assert_eq!(
            sheet.get_cell_precedents(cell("A1")),
            BTreeSet::from([cell("B1"), cell("C7")])
        );
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(3.0));
    }

    #[test]
    fn test_store_literal_never_parses() {
        let mut sheet = Spreadsheet::new();
        sheet.set("B1", "9").unwrap();
        sheet.set("A1", "=B1").unwrap();

        sheet.store_literal(cell("A1"), "=B1");

        let a1 = sheet.cell(cell("A1")).unwrap();
        assert_eq!(a1.value(), &CellValue::string("=B1"));
        assert!(!a1.is_formula());
        assert!(a1.formula().is_none());
        assert!(sheet.get_cell_dependents(cell("B1")).is_empty());
    }

    #[test]
    fn test_cell_extra_survives_edits() {
        let mut sheet = Spreadsheet::new();
        let mut extra = CellExtra::new();
        extra.insert("bold".into(), serde_json::Value::Bool(true));

        sheet.set_cell_extra(cell("A1"), extra.clone()).unwrap();
        sheet.set("A1", "1").unwrap();
        sheet.clear_cell(cell("A1")).unwrap();

        assert_eq!(sheet.cell(cell("A1")).unwrap().extra(), &extra);
    }

    #[test]
    fn test_range_values_sparse() {
        let mut sheet = Spreadsheet::new();
        sheet.set("B2", "2").unwrap();
        sheet.set("A1", "1").unwrap();
        sheet.set("Z100", "9").unwrap();

        let range = CellRange::parse("A1:C1000").unwrap();
        assert_eq!(
            sheet.range_values(&range),
            vec![CellValue::Number(1.0), CellValue::Number(2.0)]
        );
    }
}
