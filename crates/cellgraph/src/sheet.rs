//! Sheet type

use std::io;

use ahash::AHashMap;
use cellgraph_core::{CellValue, Error, Position, Result, Size};
use cellgraph_formula::CellLookup;
use tracing::{debug, trace};

use crate::arena::{CellArena, CellId};
use crate::cell::{Cell, CellContent};
use crate::graph;

/// A sheet: the owner of every cell and of the dependency graph between them
///
/// A position has a stored cell exactly when the cell has content or some
/// formula reads it. Cells read by formulas but never set are kept as empty
/// placeholders.
#[derive(Debug, Default)]
pub struct Sheet {
    /// Position → stored cell
    positions: AHashMap<Position, CellId>,
    /// Cell storage
    cells: CellArena,
}

impl Sheet {
    /// Create a new empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content of a cell from text, as a user would type it.
    ///
    /// Text starting with `=` (and longer than that) is parsed as a formula.
    /// The edit is rejected without any change to the sheet when the position
    /// is invalid, the formula does not parse, or the formula would create a
    /// circular dependency.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        check_position(pos)?;

        let existing = self.positions.get(&pos).copied();
        match existing.and_then(|id| self.cells.get(id)) {
            Some(cell) if cell.content.text() == text => return Ok(()),
            None if text.is_empty() => return Ok(()),
            _ => {}
        }

        let content = match CellContent::from_text(text) {
            Ok(content) => content,
            Err(e) => {
                debug!(cell = %pos, error = %e, "rejected edit");
                return Err(e);
            }
        };

        if graph::creates_cycle(&self.cells, existing, pos, content.referenced_cells()) {
            debug!(cell = %pos, text, "rejected edit: circular dependency");
            return Err(Error::CircularDependency(pos.to_string()));
        }

        self.commit(pos, existing, content);
        debug!(cell = %pos, text, "cell updated");
        Ok(())
    }

    /// Clear a cell's content.
    ///
    /// A cell still read by other formulas stays stored as an empty
    /// placeholder; otherwise it is removed.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        check_position(pos)?;

        if let Some(id) = self.positions.get(&pos).copied() {
            self.commit(pos, Some(id), CellContent::Empty);
            debug!(cell = %pos, "cell cleared");
        }
        Ok(())
    }

    /// Get the cell at a position, if one is stored there
    pub fn get_cell(&self, pos: Position) -> Result<Option<CellView<'_>>> {
        check_position(pos)?;

        Ok(self
            .positions
            .get(&pos)
            .and_then(|&id| self.view_by_id(id)))
    }

    /// Smallest rectangle anchored at A1 that covers every stored cell
    pub fn printable_size(&self) -> Size {
        self.positions
            .keys()
            .fold(Size::default(), |size, pos| Size {
                rows: size.rows.max(pos.row + 1),
                cols: size.cols.max(pos.col + 1),
            })
    }

    /// Write the values of the printable area, tab-separated, one line per row
    pub fn print_values<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |view| view.value().to_string())
    }

    /// Write the texts of the printable area, tab-separated, one line per row
    pub fn print_texts<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |view| view.text())
    }

    fn print_with<W, F>(&self, out: &mut W, render: F) -> io::Result<()>
    where
        W: io::Write,
        F: Fn(&CellView<'_>) -> String,
    {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                if let Some(view) = self.view(Position::new(row, col)) {
                    if !view.cell.content.is_empty() {
                        out.write_all(render(&view).as_bytes())?;
                    }
                }
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Number of stored cells (placeholders included)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions of all stored cells, in no particular order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.keys().copied()
    }

    fn view(&self, pos: Position) -> Option<CellView<'_>> {
        self.view_by_id(*self.positions.get(&pos)?)
    }

    fn view_by_id(&self, id: CellId) -> Option<CellView<'_>> {
        let cell = self.cells.get(id)?;
        Some(CellView {
            sheet: self,
            id,
            cell,
        })
    }

    /// Compute every missing formula result `id` depends on, precedents first,
    /// so that no evaluation recurses into another cell.
    fn fill_caches(&self, id: CellId) {
        let order = graph::evaluation_order(&self.cells, id);
        trace!(cells = order.len(), "computing formula results");
        for id in order {
            if let Some(cell) = self.cells.get(id) {
                cell.content.value(self);
            }
        }
    }

    /// Install validated content in the cell at `pos`.
    ///
    /// Cycle checking must already have passed. Rewires the cell's outgoing
    /// edges, creating placeholders for referenced cells that are not stored,
    /// invalidates dependent caches and drops cells left empty and
    /// unreferenced.
    fn commit(&mut self, pos: Position, existing: Option<CellId>, content: CellContent) {
        let targets = content.referenced_cells().to_vec();
        let id = existing.unwrap_or_else(|| self.materialize(pos));

        let orphaned = graph::unlink_outgoing(&mut self.cells, id);
        if let Some(cell) = self.cells.get_mut(id) {
            cell.content = content;
        }

        for target_pos in targets {
            let target = match self.positions.get(&target_pos) {
                Some(&target) => target,
                None => self.materialize(target_pos),
            };
            graph::link(&mut self.cells, id, target);
        }

        let dropped = graph::invalidate_dependents(&mut self.cells, id);
        trace!(cell = %pos, dropped, "invalidated dependent caches");

        // Storage keeps a cell only while it has content or a reader, so a
        // placeholder goes with its last reader instead of waiting for a clear.
        for orphan in orphaned {
            self.collect_if_unused(orphan);
        }
        self.collect_if_unused(id);
    }

    /// Store an empty cell at a position that has none
    fn materialize(&mut self, pos: Position) -> CellId {
        let id = self.cells.insert(Cell::new(pos));
        self.positions.insert(pos, id);
        trace!(cell = %pos, "materialized cell");
        id
    }

    fn collect_if_unused(&mut self, id: CellId) {
        let Some(pos) = self
            .cells
            .get(id)
            .filter(|cell| cell.is_unused())
            .map(Cell::position)
        else {
            return;
        };

        self.cells.remove(id);
        self.positions.remove(&pos);
        trace!(cell = %pos, "collected unused cell");
    }

    fn position_of(&self, id: CellId) -> Option<Position> {
        self.cells.get(id).map(Cell::position)
    }
}

impl CellLookup for Sheet {
    fn cell_value(&self, pos: Position) -> CellValue {
        self.view(pos)
            .map(|view| view.value())
            .unwrap_or_default()
    }
}

fn check_position(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(Error::InvalidPosition(format!(
            "row {}, column {} is outside the sheet",
            pos.row, pos.col
        )))
    }
}

/// A stored cell, borrowed together with the sheet it belongs to
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    id: CellId,
    cell: &'a Cell,
}

impl<'a> CellView<'a> {
    pub fn position(&self) -> Position {
        self.cell.position()
    }

    pub fn content(&self) -> &'a CellContent {
        self.cell.content()
    }

    /// Current value, computing and caching formula results as needed
    pub fn value(&self) -> CellValue {
        if !self.cell.content.is_cache_valid() {
            self.sheet.fill_caches(self.id);
        }
        self.cell.content.value(self.sheet)
    }

    /// Text as it would be typed back in
    pub fn text(&self) -> String {
        self.cell.content.text()
    }

    /// Positions this cell's formula reads, sorted
    pub fn referenced_cells(&self) -> &'a [Position] {
        self.cell.content.referenced_cells()
    }

    /// Positions of the cells whose formulas read this cell, sorted
    pub fn dependents(&self) -> Vec<Position> {
        let mut dependents: Vec<Position> = self
            .cell
            .incoming
            .iter()
            .filter_map(|&id| self.sheet.position_of(id))
            .collect();
        dependents.sort_unstable();
        dependents
    }

    pub fn is_cache_valid(&self) -> bool {
        self.cell.content.is_cache_valid()
    }

    /// Whether any formula reads this cell
    pub fn is_referenced(&self) -> bool {
        self.cell.is_referenced()
    }
}
