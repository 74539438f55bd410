use std::path::PathBuf;

use thiserror::Error;

use crate::grid_config::{GridCoord, Slot};

/// Problems with the inputs handed to the filler: the grid template, the slots built from it, or
/// the word list file. The filler itself never fails this way; an unsatisfiable grid is reported
/// through `FillFailure` instead.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("grid template is empty")]
    EmptyTemplate,
    #[error("grid template row {row} has width {width}, expected {expected}")]
    RaggedTemplate { row: usize, width: usize, expected: usize },
    #[error("unexpected character {cell:?} at {loc:?} (use '#' for blocks, '.' or '_' for open cells)")]
    InvalidCell { loc: GridCoord, cell: char },
    #[error("grid has no slots of length 2 or more")]
    NoSlots,
    #[error("slot {0:?} has length 0")]
    EmptySlot(Slot),
    #[error("slot {0:?} appears more than once")]
    DuplicateSlot(Slot),
    #[error("slots {0:?} and {1:?} run in the same direction through a shared cell")]
    ConflictingSlots(Slot, Slot),
}
