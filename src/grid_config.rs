use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::errors::GridError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the graph's `slots` field.
pub type SlotId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// One contiguous run of open cells that takes a single word. Two slots are the same slot iff
/// they start in the same cell, face the same way and have the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn new(start_cell: GridCoord, direction: Direction, length: usize) -> Slot {
        Slot { start_cell, direction, length }
    }

    /// The coords of the cell at `cell_idx` within this slot.
    pub fn cell(&self, cell_idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
            Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
        }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(|cell_idx| self.cell(cell_idx))
    }
}

/// Where two slots share a cell: `cell` is the index within the first slot and `other_cell` the
/// index within the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub cell: usize,
    pub other_cell: usize,
}

/// The static shape of a fill problem: the slots plus which of them cross and where. Built once
/// and never mutated while filling.
pub struct ConstraintGraph {
    slots: Vec<Slot>,
    overlaps: HashMap<(SlotId, SlotId), Overlap>,
    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,
}

impl Debug for ConstraintGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintGraph")
            .field("slots", &self.slots)
            .field("overlaps", &(self.overlaps.len() / 2))
            .finish()
    }
}

impl ConstraintGraph {
    /// Build a graph from a list of slots, working out the crossings from the cells each slot
    /// covers. Slot ids follow the order of `slots`.
    pub fn new(slots: Vec<Slot>) -> Result<ConstraintGraph, GridError> {
        let mut seen: HashSet<Slot> = HashSet::with_capacity(slots.len());
        for &slot in &slots {
            if slot.length == 0 {
                return Err(GridError::EmptySlot(slot));
            }
            if !seen.insert(slot) {
                return Err(GridError::DuplicateSlot(slot));
            }
        }

        // Map from cell location to the (slot id, cell index within slot) pairs covering it.
        let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in slot.cell_coords().enumerate() {
                let entries = entries_by_loc.entry(loc).or_default();

                // Only one across and one down slot can pass through a cell, so any existing
                // entry facing the same way is a conflict.
                if let Some(&(other_slot_id, _)) =
                    entries.iter().find(|&&(other, _)| slots[other].direction == slot.direction)
                {
                    return Err(GridError::ConflictingSlots(slots[other_slot_id], *slot));
                }
                entries.push((slot_id, cell_idx));
            }
        }

        let mut overlaps: HashMap<(SlotId, SlotId), Overlap> = HashMap::new();
        let mut neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>> =
            slots.iter().map(|_| SmallVec::new()).collect();

        for entries in entries_by_loc.values() {
            if let [(slot_id, cell), (other_slot_id, other_cell)] = entries[..] {
                overlaps.insert((slot_id, other_slot_id), Overlap { cell, other_cell });
                overlaps.insert(
                    (other_slot_id, slot_id),
                    Overlap { cell: other_cell, other_cell: cell },
                );
                neighbors[slot_id].push(other_slot_id);
                neighbors[other_slot_id].push(slot_id);
            }
        }

        for slot_neighbors in &mut neighbors {
            slot_neighbors.sort_unstable();
        }

        Ok(ConstraintGraph { slots, overlaps, neighbors })
    }

    /// Parse a template string and build the graph for it. See `parse_template`.
    pub fn from_template(template: &str) -> Result<ConstraintGraph, GridError> {
        ConstraintGraph::new(parse_template(template)?)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_ids(&self) -> std::ops::Range<SlotId> {
        0..self.slots.len()
    }

    /// Find the id of a slot by value.
    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slots.iter().position(|s| s == slot)
    }

    /// The crossing between `slot_id` and `other_slot_id`, if they share a cell.
    pub fn overlap(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<Overlap> {
        self.overlaps.get(&(slot_id, other_slot_id)).copied()
    }

    /// Every slot crossing `slot_id`, in ascending id order.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }
}

/// Extract the slots from a string template, with `#` representing blocks and `.` or `_`
/// representing open cells. Every run of at least two open cells is a slot; across slots come
/// first in row-major order, followed by down slots in column-major order.
pub fn parse_template(template: &str) -> Result<Vec<Slot>, GridError> {
    let template: Vec<Vec<char>> = template
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.chars().collect())
            }
        })
        .collect();

    let width = template.first().map(|row| row.len()).ok_or(GridError::EmptyTemplate)?;

    let mut open: Vec<Vec<bool>> = Vec::with_capacity(template.len());
    for (y, row) in template.iter().enumerate() {
        if row.len() != width {
            return Err(GridError::RaggedTemplate { row: y, width: row.len(), expected: width });
        }
        let open_row = row
            .iter()
            .enumerate()
            .map(|(x, &cell)| match cell {
                '#' => Ok(false),
                '.' | '_' => Ok(true),
                _ => Err(GridError::InvalidCell { loc: (x, y), cell }),
            })
            .collect::<Result<Vec<bool>, GridError>>()?;
        open.push(open_row);
    }

    // Walk a sequence of cells and return the start index and length of each run of open cells
    // long enough to be a slot.
    fn build_runs(cells: impl Iterator<Item = bool>) -> Vec<(usize, usize)> {
        let mut result = vec![];
        let mut run_start: Option<usize> = None;
        let mut len = 0;

        for (idx, is_open) in cells.enumerate() {
            if is_open {
                if run_start.is_none() {
                    run_start = Some(idx);
                }
                len += 1;
            } else {
                if let Some(start) = run_start.take() {
                    if len > 1 {
                        result.push((start, len));
                    }
                }
                len = 0;
            }
        }
        if let Some(start) = run_start {
            if len > 1 {
                result.push((start, len));
            }
        }

        result
    }

    let mut slots: Vec<Slot> = vec![];

    for (y, row) in open.iter().enumerate() {
        for (x, len) in build_runs(row.iter().copied()) {
            slots.push(Slot::new((x, y), Direction::Across, len));
        }
    }

    for x in 0..width {
        for (y, len) in build_runs(open.iter().map(|row| row[x])) {
            slots.push(Slot::new((x, y), Direction::Down, len));
        }
    }

    if slots.is_empty() {
        return Err(GridError::NoSlots);
    }

    Ok(slots)
}
