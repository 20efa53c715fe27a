//! Dependency graph maintenance
//!
//! Edges live on the cells themselves: `outgoing` holds the cells a formula
//! reads, `incoming` the cells whose formulas read it. Every function here
//! keeps the two sets mirror images of each other across the arena.
//!
//! Walks use an explicit stack so long reference chains cannot exhaust the
//! call stack.

use ahash::AHashSet;
use cellgraph_core::Position;

use crate::arena::{CellArena, CellId};

/// Check whether giving the cell at `start_pos` the outgoing references
/// `targets` would close a cycle.
///
/// Walks the current incoming edges backwards from the edited cell, collecting
/// every cell that transitively depends on it. The edit is cyclic if any of
/// those cells (the edited cell included) is among the new targets.
pub(crate) fn creates_cycle(
    cells: &CellArena,
    start: Option<CellId>,
    start_pos: Position,
    targets: &[Position],
) -> bool {
    if targets.is_empty() {
        return false;
    }

    let targets: AHashSet<Position> = targets.iter().copied().collect();
    if targets.contains(&start_pos) {
        return true;
    }

    // A cell that does not exist yet has no dependents
    let Some(start) = start else {
        return false;
    };

    let mut visited = AHashSet::new();
    let mut stack = vec![start];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(cell) = cells.get(id) else {
            continue;
        };
        if targets.contains(&cell.position()) {
            return true;
        }
        stack.extend(cell.incoming.iter().filter(|dep| !visited.contains(*dep)));
    }

    false
}

/// Add the edge `from → to` and its mirror
pub(crate) fn link(cells: &mut CellArena, from: CellId, to: CellId) {
    if let Some(cell) = cells.get_mut(from) {
        cell.outgoing.insert(to);
    }
    if let Some(cell) = cells.get_mut(to) {
        cell.incoming.insert(from);
    }
}

/// Remove every outgoing edge of `id` and the mirrored incoming edges.
///
/// Returns the former targets that are no longer read by any cell.
pub(crate) fn unlink_outgoing(cells: &mut CellArena, id: CellId) -> Vec<CellId> {
    let outgoing = match cells.get_mut(id) {
        Some(cell) => std::mem::take(&mut cell.outgoing),
        None => return Vec::new(),
    };

    let mut orphaned = Vec::new();
    for target in outgoing {
        if let Some(cell) = cells.get_mut(target) {
            cell.incoming.remove(&id);
            if cell.incoming.is_empty() {
                orphaned.push(target);
            }
        }
    }
    orphaned
}

/// Formula cells without a cached result that `start` reads transitively,
/// `start` included, each listed after every cell it reads.
///
/// Walking stops at cells that already hold a result or have no formula.
/// Evaluating in this order means no evaluation has to compute another cell.
pub(crate) fn evaluation_order(cells: &CellArena, start: CellId) -> Vec<CellId> {
    let mut order = Vec::new();
    let mut visited = AHashSet::new();
    let mut stack = vec![(start, false)];

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        if !visited.insert(id) {
            continue;
        }
        let Some(cell) = cells.get(id) else {
            continue;
        };
        if cell.content.is_cache_valid() {
            continue;
        }

        stack.push((id, true));
        stack.extend(
            cell.outgoing
                .iter()
                .filter(|target| !visited.contains(*target))
                .map(|&target| (target, false)),
        );
    }

    order
}

/// Invalidate the cache of `start` and of everything that depends on it.
///
/// `start` is always invalidated and its dependents always visited. Below
/// that, the walk stops at cells whose cache was already empty: a formula only
/// caches a result after every cell it reads has cached one, so the
/// dependents of an uncached cell are uncached too. This relies on the graph
/// being acyclic.
///
/// Returns the number of caches dropped.
pub(crate) fn invalidate_dependents(cells: &mut CellArena, start: CellId) -> usize {
    let mut dropped = 0;
    let mut stack: Vec<CellId> = match cells.get_mut(start) {
        Some(cell) => {
            if cell.content.invalidate_cache() {
                dropped += 1;
            }
            cell.incoming.iter().copied().collect()
        }
        None => return 0,
    };

    while let Some(id) = stack.pop() {
        let Some(cell) = cells.get_mut(id) else {
            continue;
        };
        if cell.content.invalidate_cache() {
            dropped += 1;
            stack.extend(cell.incoming.iter().copied());
        }
    }

    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellContent};
    use cellgraph_formula::NoCells;

    fn insert(cells: &mut CellArena, row: u32, col: u32) -> CellId {
        cells.insert(Cell::new(Position::new(row, col)))
    }

    #[test]
    fn test_link_and_unlink_are_mirrored() {
        let mut cells = CellArena::default();
        let a = insert(&mut cells, 0, 0);
        let b = insert(&mut cells, 0, 1);
        let c = insert(&mut cells, 0, 2);

        // C reads A and B; B reads A
        link(&mut cells, c, a);
        link(&mut cells, c, b);
        link(&mut cells, b, a);

        assert!(cells.get(a).unwrap().incoming.contains(&c));
        assert!(cells.get(a).unwrap().incoming.contains(&b));

        let orphaned = unlink_outgoing(&mut cells, c);
        // A is still read by B
        assert_eq!(orphaned, vec![b]);
        assert!(cells.get(c).unwrap().outgoing.is_empty());
        assert_eq!(cells.get(a).unwrap().incoming.len(), 1);
    }

    #[test]
    fn test_creates_cycle() {
        let mut cells = CellArena::default();
        let a = insert(&mut cells, 0, 0);
        let b = insert(&mut cells, 0, 1);
        let c = insert(&mut cells, 0, 2);

        // C -> B -> A
        link(&mut cells, c, b);
        link(&mut cells, b, a);

        let a_pos = Position::new(0, 0);
        let c_pos = Position::new(0, 2);
        let d_pos = Position::new(0, 3);

        assert!(creates_cycle(&cells, Some(a), a_pos, &[c_pos]));
        assert!(creates_cycle(&cells, Some(a), a_pos, &[a_pos]));
        assert!(!creates_cycle(&cells, Some(a), a_pos, &[d_pos]));
        assert!(!creates_cycle(&cells, Some(c), c_pos, &[a_pos]));
        assert!(!creates_cycle(&cells, Some(a), a_pos, &[]));

        // A brand-new cell can only cycle through itself
        assert!(creates_cycle(&cells, None, d_pos, &[d_pos]));
        assert!(!creates_cycle(&cells, None, d_pos, &[a_pos]));
    }

    #[test]
    fn test_evaluation_order_puts_precedents_first() {
        let mut cells = CellArena::default();
        let a = insert(&mut cells, 0, 0);
        let b = insert(&mut cells, 0, 1);
        let c = insert(&mut cells, 0, 2);
        let d = insert(&mut cells, 0, 3);

        // D reads B and C, both read A; B already holds a result
        for (id, text) in [(b, "=A1"), (c, "=A1*2"), (d, "=B1+C1")] {
            cells.get_mut(id).unwrap().content = CellContent::from_text(text).unwrap();
        }
        cells.get(b).unwrap().content.value(&NoCells);
        link(&mut cells, b, a);
        link(&mut cells, c, a);
        link(&mut cells, d, b);
        link(&mut cells, d, c);

        assert_eq!(evaluation_order(&cells, d), vec![c, d]);
        assert_eq!(evaluation_order(&cells, b), Vec::<CellId>::new());
        assert_eq!(evaluation_order(&cells, a), Vec::<CellId>::new());
    }

    #[test]
    fn test_evaluation_order_on_shared_precedents() {
        let mut cells = CellArena::default();
        let ids: Vec<CellId> = (0..4).map(|row| insert(&mut cells, row, 0)).collect();

        // Row n reads every row above it
        for row in 1..ids.len() {
            let text = format!("={}", Position::new(row as u32 - 1, 0));
            cells.get_mut(ids[row]).unwrap().content = CellContent::from_text(&text).unwrap();
            for above in 0..row {
                link(&mut cells, ids[row], ids[above]);
            }
        }

        let order = evaluation_order(&cells, ids[3]);
        assert_eq!(order, vec![ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn test_invalidation_walks_through_cached_cells() {
        let mut cells = CellArena::default();
        let a = insert(&mut cells, 0, 0);
        let b = insert(&mut cells, 0, 1);
        let c = insert(&mut cells, 0, 2);

        for (id, text) in [(b, "=A1"), (c, "=B1")] {
            let cell = cells.get_mut(id).unwrap();
            cell.content = CellContent::from_text(text).unwrap();
            cell.content.value(&NoCells);
        }
        link(&mut cells, b, a);
        link(&mut cells, c, b);

        assert_eq!(invalidate_dependents(&mut cells, a), 2);
        assert!(!cells.get(b).unwrap().content.is_cache_valid());
        assert!(!cells.get(c).unwrap().content.is_cache_valid());
    }

    #[test]
    fn test_invalidation_stops_at_uncached_cells() {
        let mut cells = CellArena::default();
        let a = insert(&mut cells, 0, 0);
        let b = insert(&mut cells, 0, 1);
        let c = insert(&mut cells, 0, 2);

        for (id, text) in [(b, "=A1"), (c, "=B1")] {
            cells.get_mut(id).unwrap().content = CellContent::from_text(text).unwrap();
        }
        link(&mut cells, b, a);
        link(&mut cells, c, b);

        // Only C holds a result; B never computed one, so the walk ends at B
        cells.get(c).unwrap().content.value(&NoCells);
        assert_eq!(invalidate_dependents(&mut cells, a), 0);
        assert!(cells.get(c).unwrap().content.is_cache_valid());
    }
}
