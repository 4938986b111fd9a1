//! Dependency tracking for formula calculation

use crate::ast::Precedent;
use ahash::{AHashMap, AHashSet};
use cellgrid_core::{CellId, CellRange};
use log::trace;
use std::collections::VecDeque;

/// Dependency graph for formula cells
///
/// Tracks which cells and ranges each formula reads, and the reverse
/// edges, so an edit only recalculates the cells that can see it.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Formula cell → cells and ranges it reads (precedents)
    precedents: AHashMap<CellId, AHashSet<Precedent>>,
    /// Cell → formula cells that read it directly
    cell_dependents: AHashMap<CellId, AHashSet<CellId>>,
    /// Range → formula cells that read it
    range_dependents: AHashMap<CellRange, AHashSet<CellId>>,
}

/// One step of a recalculation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecalcStep {
    /// Evaluate the cell's formula
    Evaluate(CellId),
    /// The cells form a reference cycle and are not evaluated
    Circular(Vec<CellId>),
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every precedent edge of `cell`
    ///
    /// Old edges are dropped before the new ones are added, never merged.
    pub fn set_precedents<I>(&mut self, cell: CellId, precedents: I)
    where
        I: IntoIterator<Item = Precedent>,
    {
        self.clear_precedents(cell);

        let precedents: AHashSet<Precedent> = precedents.into_iter().collect();
        if precedents.is_empty() {
            return;
        }

        for precedent in &precedents {
            match precedent {
                Precedent::Cell(id) => {
                    self.cell_dependents.entry(*id).or_default().insert(cell);
                }
                Precedent::Range(range) => {
                    self.range_dependents.entry(*range).or_default().insert(cell);
                }
            }
        }
        self.precedents.insert(cell, precedents);
    }

    /// Remove all precedent edges of `cell`
    ///
    /// Edges from formulas that read `cell` are kept; those formulas still
    /// name it.
    pub fn clear_precedents(&mut self, cell: CellId) {
        let Some(precedents) = self.precedents.remove(&cell) else {
            return;
        };

        for precedent in precedents {
            match precedent {
                Precedent::Cell(id) => {
                    if let Some(deps) = self.cell_dependents.get_mut(&id) {
                        deps.remove(&cell);
                        if deps.is_empty() {
                            self.cell_dependents.remove(&id);
                        }
                    }
                }
                Precedent::Range(range) => {
                    if let Some(deps) = self.range_dependents.get_mut(&range) {
                        deps.remove(&cell);
                        if deps.is_empty() {
                            self.range_dependents.remove(&range);
                        }
                    }
                }
            }
        }
    }

    /// Get the cells and ranges the given cell reads, sorted
    pub fn get_precedents(&self, cell: CellId) -> Vec<Precedent> {
        let mut precedents: Vec<Precedent> = self
            .precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
            .collect();
        precedents.sort_unstable();
        precedents
    }

    /// Get the formula cells that read the given cell directly, sorted
    pub fn get_dependents(&self, cell: CellId) -> Vec<CellId> {
        let mut dependents: AHashSet<CellId> = self
            .cell_dependents
            .get(&cell)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();

        for (range, readers) in &self.range_dependents {
            if range.contains(&cell) {
                dependents.extend(readers.iter().copied());
            }
        }

        let mut dependents: Vec<CellId> = dependents.into_iter().collect();
        dependents.sort_unstable();
        dependents
    }

    /// Check if a cell has a formula with at least one reference
    pub fn has_precedents(&self, cell: CellId) -> bool {
        self.precedents.contains_key(&cell)
    }

    /// Get the changed cells plus everything that transitively depends on them, sorted
    pub fn affected_cells(&self, changed: &[CellId]) -> Vec<CellId> {
        let mut seen: AHashSet<CellId> = changed.iter().copied().collect();
        let mut queue: VecDeque<CellId> = changed.iter().copied().collect();

        while let Some(cell) = queue.pop_front() {
            for dependent in self.get_dependents(cell) {
                if seen.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        let mut affected: Vec<CellId> = seen.into_iter().collect();
        affected.sort_unstable();
        affected
    }

    /// Order a set of cells for recalculation
    ///
    /// Every cell comes after all of its precedents in the set. Strongly
    /// connected groups (and cells that read themselves) come out as a
    /// single [`RecalcStep::Circular`] step.
    pub fn recalc_plan(&self, cells: &[CellId]) -> Vec<RecalcStep> {
        let mut nodes: Vec<CellId> = cells.to_vec();
        nodes.sort_unstable();
        nodes.dedup();

        let position: AHashMap<CellId, usize> =
            nodes.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        // Successor lists follow precedent → dependent edges inside the set
        let successors: Vec<Vec<usize>> = nodes
            .iter()
            .map(|id| {
                self.get_dependents(*id)
                    .into_iter()
                    .filter_map(|dep| position.get(&dep).copied())
                    .collect()
            })
            .collect();

        // Tarjan emits components sinks-first; reversed, precedents come first
        let mut components = strongly_connected_components(&successors);
        components.reverse();

        let plan: Vec<RecalcStep> = components
            .into_iter()
            .map(|component| {
                if let [single] = component[..] {
                    if !successors[single].contains(&single) {
                        return RecalcStep::Evaluate(nodes[single]);
                    }
                }
                let mut members: Vec<CellId> = component.iter().map(|&i| nodes[i]).collect();
                members.sort_unstable();
                RecalcStep::Circular(members)
            })
            .collect();

        trace!("Recalc plan: {} step(s) over {} cell(s)", plan.len(), nodes.len());
        plan
    }
}

/// Iterative Tarjan over an adjacency list
///
/// Components are returned in reverse topological order: a component is
/// emitted only after every component reachable from it.
fn strongly_connected_components(successors: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = successors.len();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut next_index = 0;
    let mut components = Vec::new();

    // Roots in reverse so unrelated cells come out in ascending order once reversed
    for root in (0..n).rev() {
        if index[root].is_some() {
            continue;
        }

        // (node, next successor to look at)
        let mut call_stack: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = Some(next_index);
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(&(v, pos)) = call_stack.last() {
            if let Some(&w) = successors[v].get(pos) {
                let top = call_stack.len() - 1;
                call_stack[top].1 += 1;

                match index[w] {
                    None => {
                        index[w] = Some(next_index);
                        lowlink[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        call_stack.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if Some(lowlink[v]) == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(text: &str) -> CellId {
        CellId::parse(text).unwrap()
    }

    fn range(text: &str) -> CellRange {
        CellRange::parse(text).unwrap()
    }

    #[test]
    fn test_set_precedents() {
        let mut graph = DependencyGraph::new();

        graph.set_precedents(cell("B1"), [Precedent::Cell(cell("A1"))]);

        assert_eq!(graph.get_dependents(cell("A1")), vec![cell("B1")]);
        assert_eq!(
            graph.get_precedents(cell("B1")),
            vec![Precedent::Cell(cell("A1"))]
        );
    }

    #[test]
    fn test_precedents_are_replaced() {
        let mut graph = DependencyGraph::new();

        graph.set_precedents(cell("C1"), [Precedent::Cell(cell("A1"))]);
        graph.set_precedents(cell("C1"), [Precedent::Cell(cell("B1"))]);

        assert!(graph.get_dependents(cell("A1")).is_empty());
        assert_eq!(graph.get_dependents(cell("B1")), vec![cell("C1")]);

        graph.set_precedents(cell("C1"), []);
        assert!(graph.get_dependents(cell("B1")).is_empty());
        assert!(!graph.has_precedents(cell("C1")));
    }

    #[test]
    fn test_range_dependents() {
        let mut graph = DependencyGraph::new();

        graph.set_precedents(cell("B1"), [Precedent::Range(range("A1:A10"))]);

        assert_eq!(graph.get_dependents(cell("A5")), vec![cell("B1")]);
        assert!(graph.get_dependents(cell("A11")).is_empty());
        assert!(graph.get_dependents(cell("B5")).is_empty());
    }

    #[test]
    fn test_affected_cells() {
        let mut graph = DependencyGraph::new();

        // A1 -> B1 -> C1, A1 -> D1 (via range), E1 unrelated
        graph.set_precedents(cell("B1"), [Precedent::Cell(cell("A1"))]);
        graph.set_precedents(cell("C1"), [Precedent::Cell(cell("B1"))]);
        graph.set_precedents(cell("D1"), [Precedent::Range(range("A1:A3"))]);
        graph.set_precedents(cell("E1"), [Precedent::Cell(cell("Z1"))]);

        assert_eq!(
            graph.affected_cells(&[cell("A1")]),
            vec![cell("A1"), cell("B1"), cell("C1"), cell("D1")]
        );
    }

    #[test]
    fn test_recalc_plan_order() {
        let mut graph = DependencyGraph::new();

        // D1 reads C1 and A1; C1 reads B1; B1 reads A1
        graph.set_precedents(
            cell("D1"),
            [Precedent::Cell(cell("C1")), Precedent::Cell(cell("A1"))],
        );
        graph.set_precedents(cell("C1"), [Precedent::Cell(cell("B1"))]);
        graph.set_precedents(cell("B1"), [Precedent::Cell(cell("A1"))]);

        let affected = graph.affected_cells(&[cell("A1")]);
        assert_eq!(
            graph.recalc_plan(&affected),
            vec![
                RecalcStep::Evaluate(cell("A1")),
                RecalcStep::Evaluate(cell("B1")),
                RecalcStep::Evaluate(cell("C1")),
                RecalcStep::Evaluate(cell("D1")),
            ]
        );
    }

    #[test]
    fn test_circular_reference() {
        let mut graph = DependencyGraph::new();

        // A1 -> B1 -> C1 -> A1 (circular), D1 reads C1
        graph.set_precedents(cell("B1"), [Precedent::Cell(cell("A1"))]);
        graph.set_precedents(cell("C1"), [Precedent::Cell(cell("B1"))]);
        graph.set_precedents(cell("A1"), [Precedent::Cell(cell("C1"))]);
        graph.set_precedents(cell("D1"), [Precedent::Cell(cell("C1"))]);

        let affected = graph.affected_cells(&[cell("A1")]);
        assert_eq!(
            graph.recalc_plan(&affected),
            vec![
                RecalcStep::Circular(vec![cell("A1"), cell("B1"), cell("C1")]),
                RecalcStep::Evaluate(cell("D1")),
            ]
        );
    }

    #[test]
    fn test_self_reference() {
        let mut graph = DependencyGraph::new();

        graph.set_precedents(cell("A1"), [Precedent::Range(range("A1:A3"))]);

        assert_eq!(
            graph.recalc_plan(&[cell("A1")]),
            vec![RecalcStep::Circular(vec![cell("A1")])]
        );
    }

    #[test]
    fn test_long_chain() {
        let mut graph = DependencyGraph::new();

        // A1 <- A2 <- ... <- A5000
        for row in 2..=5000 {
            graph.set_precedents(
                CellId::new(1, row),
                [Precedent::Cell(CellId::new(1, row - 1))],
            );
        }

        let affected = graph.affected_cells(&[cell("A1")]);
        let plan = graph.recalc_plan(&affected);
        assert_eq!(plan.len(), 5000);
        assert_eq!(plan[0], RecalcStep::Evaluate(cell("A1")));
        assert_eq!(plan[4999], RecalcStep::Evaluate(CellId::new(1, 5000)));
    }
}
