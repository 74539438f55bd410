use std::collections::BTreeMap;

use crate::grid_config::{ConstraintGraph, Slot};

/// Turn the given graph and (possibly partial) assignment into a rendered string. The grid spans
/// the bounding box of the slots: assigned cells show their letter, cells belonging to an
/// unassigned slot show `.`, and cells no slot covers show `#`.
pub fn render_grid(graph: &ConstraintGraph, assignment: &BTreeMap<Slot, String>) -> String {
    let covered: Vec<_> = graph.slots().iter().flat_map(|slot| slot.cell_coords()).collect();

    let (Some(max_x), Some(max_y)) =
        (covered.iter().map(|&(x, _)| x).max(), covered.iter().map(|&(_, y)| y).max())
    else {
        return String::new();
    };

    let mut grid: Vec<Vec<char>> = (0..=max_y).map(|_| vec!['#'; max_x + 1]).collect();

    for &(x, y) in &covered {
        grid[y][x] = '.';
    }

    for slot in graph.slots() {
        if let Some(word) = assignment.get(slot) {
            for ((x, y), glyph) in slot.cell_coords().zip(word.chars()) {
                grid[y][x] = glyph;
            }
        }
    }

    grid.into_iter().map(|row| row.into_iter().collect::<String>()).collect::<Vec<_>>().join("\n")
}
