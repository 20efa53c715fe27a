//! Slot storage for cells with generational handles

use crate::cell::Cell;

/// Stable handle to a cell stored in a [`Sheet`](crate::Sheet)
///
/// A handle pairs a slot index with the slot's generation at insertion time.
/// Once the cell is removed the slot's generation moves on, so the handle
/// stops resolving even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

/// Arena owning every cell of a sheet
#[derive(Debug, Default)]
pub(crate) struct CellArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl CellArena {
    pub(crate) fn insert(&mut self, cell: Cell) -> CellId {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.cell = Some(cell);
            return CellId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            cell: Some(cell),
        });
        CellId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn remove(&mut self, id: CellId) -> Option<Cell> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }

        let cell = slot.cell.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(cell)
    }

    pub(crate) fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
