//! Fill a crossword-style grid from a word list. A grid is described by its slots (runs of open
//! cells) and the cells where they cross; filling picks one word per slot so that lengths match,
//! crossing slots agree on their shared letter, and no word is used twice.
//!
//! ```
//! use gridfill::{find_fill, render_grid, ConstraintGraph, SolverConfig, WordList};
//!
//! let graph = ConstraintGraph::from_template("...\n.#.\n...").unwrap();
//! let word_list = WordList::new(["CAT", "TOE", "CUP", "PIE", "AXE", "EEL"]);
//!
//! match find_fill(&graph, &word_list, SolverConfig::default()) {
//!     Ok(result) => println!("{}", render_grid(&graph, &result.assignment)),
//!     Err(failure) => println!("No solution: {failure}"),
//! }
//! ```

pub mod arc_consistency;
pub mod backtracking_search;
pub mod config;
pub mod domains;
pub mod errors;
pub mod grid_config;
pub mod render;
pub mod word_list;

pub use backtracking_search::{find_fill, Choice, FillFailure, FillSuccess, Filler, Statistics};
pub use config::SolverConfig;
pub use errors::GridError;
pub use grid_config::{ConstraintGraph, Direction, Slot, SlotId};
pub use render::render_grid;
pub use word_list::{WordId, WordList};

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
