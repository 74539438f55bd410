//! Node and arc consistency over the slot domains. Node consistency drops words of the wrong
//! length; arc consistency (AC-3) drops words that can't agree with any remaining word in a
//! crossing slot, repeating until nothing else changes or some slot runs out of options.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use crate::domains::Domains;
use crate::grid_config::{ConstraintGraph, Overlap, SlotId};
use crate::word_list::{WordId, WordList};

/// A directed arc `(x, y)`: make `x` consistent with `y`.
pub type Arc = (SlotId, SlotId);

/// FIFO worklist of arcs still to be revised.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<Arc>,
}

impl ArcQueue {
    /// Every directed arc in the graph: for each slot in id order, one arc per neighbor.
    fn all_arcs(graph: &ConstraintGraph) -> ArcQueue {
        ArcQueue {
            queue: graph
                .slot_ids()
                .flat_map(|slot_id| graph.neighbors(slot_id).iter().map(move |&n| (slot_id, n)))
                .collect(),
        }
    }

    fn with_initial_queue<Arcs>(arcs: Arcs) -> ArcQueue
    where
        Arcs: IntoIterator<Item = Arc>,
    {
        ArcQueue { queue: arcs.into_iter().collect() }
    }

    fn pop_front(&mut self) -> Option<Arc> {
        self.queue.pop_front()
    }

    fn push_back(&mut self, arc: Arc) {
        self.queue.push_back(arc);
    }
}

/// Results from a call to `establish_arc_consistency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised.
    pub revisions: usize,
    /// How many words were removed across all domains.
    pub eliminations: usize,
}

/// Propagation emptied the domain of `slot_id`, so the current domains admit no fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
    /// How many arcs were revised before giving up.
    pub revisions: usize,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove every word whose length doesn't match its slot. Returns the number of words removed.
pub fn enforce_node_consistency(
    graph: &ConstraintGraph,
    word_list: &WordList,
    domains: &mut Domains,
) -> usize {
    let mut eliminations = 0;

    for slot_id in graph.slot_ids() {
        let length = graph.slot(slot_id).length;
        let mismatched: Vec<WordId> =
            domains.iter(slot_id).filter(|&word_id| word_list.word(word_id).len() != length).collect();

        for word_id in mismatched {
            domains.remove(slot_id, word_id);
            eliminations += 1;
        }
    }

    debug!(eliminations, "enforced node consistency");
    eliminations
}

/// Make `x` arc consistent with `y`: remove each word in `x`'s domain that has no word in `y`'s
/// domain with the same glyph in their shared cell. Slots that don't cross are left alone.
/// Returns whether anything was removed.
pub fn revise(
    graph: &ConstraintGraph,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some(Overlap { cell, other_cell }) = graph.overlap(x, y) else {
        return false;
    };

    // Which glyphs can `y` still put in the shared cell?
    let supported: HashSet<char> = domains
        .iter(y)
        .filter_map(|word_id| word_list.word(word_id).glyphs.get(other_cell).copied())
        .collect();

    let unsupported: Vec<WordId> = domains
        .iter(x)
        .filter(|&word_id| {
            word_list.word(word_id).glyphs.get(cell).map_or(true, |glyph| !supported.contains(glyph))
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    if !unsupported.is_empty() {
        trace!(x, y, removed = unsupported.len(), "revised arc");
    }

    !unsupported.is_empty()
}

/// Run AC-3. If `arcs` is `None`, start from every arc in the graph; otherwise start from the
/// given arcs only. Arcs are processed first-in first-out. Fails as soon as any domain becomes
/// empty, leaving the domains in whatever partially-pruned state they reached.
pub fn establish_arc_consistency(
    graph: &ConstraintGraph,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<Arc>>,
) -> ArcConsistencyResult {
    let mut queue = match arcs {
        Some(arcs) => ArcQueue::with_initial_queue(arcs),
        None => ArcQueue::all_arcs(graph),
    };

    let mut success = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        success.revisions += 1;

        let before = domains.len(x);
        if !revise(graph, word_list, domains, x, y) {
            continue;
        }
        success.eliminations += before - domains.len(x);

        if domains.is_empty(x) {
            debug!(slot_id = x, revisions = success.revisions, "arc consistency emptied a domain");
            return Err(ArcConsistencyFailure { slot_id: x, revisions: success.revisions });
        }

        // `x` shrank, so anything relying on `x` for support needs another look.
        for &z in graph.neighbors(x) {
            if z != y {
                queue.push_back((z, x));
            }
        }
    }

    debug!(
        revisions = success.revisions,
        eliminations = success.eliminations,
        "established arc consistency"
    );
    Ok(success)
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{
        enforce_node_consistency, establish_arc_consistency, revise, ArcConsistencyFailure,
    };
    use crate::domains::Domains;
    use crate::grid_config::Direction::{Across, Down};
    use crate::grid_config::{ConstraintGraph, Slot};
    use crate::word_list::WordList;

    fn words_in(domains: &Domains, word_list: &WordList, slot_id: usize) -> Vec<String> {
        domains.iter(slot_id).map(|word_id| word_list.word(word_id).string.clone()).collect()
    }

    /// Across slot whose last cell is the first cell of a down slot.
    fn corner_graph() -> ConstraintGraph {
        ConstraintGraph::new(vec![Slot::new((0, 0), Across, 3), Slot::new((2, 0), Down, 3)])
            .unwrap()
    }

    fn assert_arc_consistent(graph: &ConstraintGraph, word_list: &WordList, domains: &Domains) {
        for x in graph.slot_ids() {
            for &y in graph.neighbors(x) {
                let overlap = graph.overlap(x, y).unwrap();
                for word_id in domains.iter(x) {
                    let glyph = word_list.word(word_id).glyphs[overlap.cell];
                    assert!(
                        domains
                            .iter(y)
                            .any(|other| word_list.word(other).glyphs[overlap.other_cell] == glyph),
                        "{} in slot {} has no support in slot {}",
                        word_list.word(word_id).string,
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_node_consistency_removes_wrong_lengths() {
        let graph = ConstraintGraph::from_template("....#\n#....").unwrap();
        let word_list = WordList::new(["EXAM", "QUIZ", "CAT", "HORSE", "A"]);
        let mut domains = Domains::new(&graph, &word_list);

        let eliminated = enforce_node_consistency(&graph, &word_list, &mut domains);

        // Two across slots of length 4, plus three down slots of length 2 that end up empty.
        for slot_id in graph.slot_ids() {
            let length = graph.slot(slot_id).length;
            for word_id in domains.iter(slot_id) {
                assert_eq!(word_list.word(word_id).len(), length);
            }
        }
        assert_eq!(words_in(&domains, &word_list, 0), vec!["EXAM", "QUIZ"]);
        assert!(eliminated > 0);
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let graph = corner_graph();
        let word_list = WordList::new(["TEA", "CAT", "ACT", "DOG"]);
        let mut domains = Domains::new(&graph, &word_list);

        // Down must start with a letter some across word ends with (A, T, G).
        assert!(revise(&graph, &word_list, &mut domains, 1, 0));
        assert_eq!(words_in(&domains, &word_list, 1), vec!["TEA", "ACT"]);

        // Running it again changes nothing.
        assert!(!revise(&graph, &word_list, &mut domains, 1, 0));
    }

    #[test]
    fn test_revise_ignores_independent_slots() {
        let graph = ConstraintGraph::new(vec![
            Slot::new((0, 0), Across, 3),
            Slot::new((0, 2), Across, 3),
        ])
        .unwrap();
        let word_list = WordList::new(["ABC", "XYZ"]);
        let mut domains = Domains::new(&graph, &word_list);

        assert!(!revise(&graph, &word_list, &mut domains, 0, 1));
        assert_eq!(domains.len(0), 2);
    }

    #[test]
    fn test_arc_consistency_prunes_to_closure() {
        let graph = corner_graph();
        let word_list = WordList::new(["TEA", "CAT", "ACT", "DOG"]);
        let mut domains = Domains::new(&graph, &word_list);

        enforce_node_consistency(&graph, &word_list, &mut domains);
        let success = establish_arc_consistency(&graph, &word_list, &mut domains, None).unwrap();

        assert_eq!(words_in(&domains, &word_list, 0), vec!["TEA", "CAT", "ACT"]);
        assert_eq!(words_in(&domains, &word_list, 1), vec!["TEA", "ACT"]);
        assert_eq!(success.eliminations, 3);
        assert_arc_consistent(&graph, &word_list, &domains);
    }

    #[test]
    fn test_arc_consistency_closure_on_larger_grid() {
        let graph = ConstraintGraph::from_template(
            "
            ....
            .##.
            ....
            ",
        )
        .unwrap();
        let word_list = WordList::new([
            "ABLE", "AXES", "EASY", "SORT", "SEAT", "TEAS", "ACE", "EYE", "SAT", "TOY", "YES",
            "TAX", "TOS", "ZOO",
        ]);
        let mut domains = Domains::new(&graph, &word_list);

        enforce_node_consistency(&graph, &word_list, &mut domains);
        establish_arc_consistency(&graph, &word_list, &mut domains, None).unwrap();

        assert_arc_consistent(&graph, &word_list, &domains);

        // SEAT / SAT / TEAS / TOS is a fill, so none of it may be pruned.
        let seat = word_list.word_id("SEAT").unwrap();
        let zoo = word_list.word_id("ZOO").unwrap();
        assert!(domains.contains(0, seat));
        assert!(!domains.contains(2, zoo));
        assert!(!domains.contains(3, zoo));
    }

    #[test]
    fn test_arc_consistency_fails_on_empty_domain() {
        let graph = ConstraintGraph::new(vec![
            Slot::new((0, 1), Across, 3),
            Slot::new((1, 0), Down, 3),
        ])
        .unwrap();
        let word_list = WordList::new(["ABC", "XYZ"]);
        let mut domains = Domains::new(&graph, &word_list);

        // Leave each slot with a word whose middle letter the other can't match.
        domains.remove(0, 1);
        domains.remove(1, 0);
        enforce_node_consistency(&graph, &word_list, &mut domains);

        let result = establish_arc_consistency(&graph, &word_list, &mut domains, None);
        assert_eq!(result, Err(ArcConsistencyFailure { slot_id: 0, revisions: 1 }));
        assert!(domains.is_empty(0));
    }

    #[test]
    fn test_arc_consistency_from_given_arcs() {
        let graph = corner_graph();
        let word_list = WordList::new(["TEA", "CAT", "ACT", "DOG"]);
        let mut domains = Domains::new(&graph, &word_list);
        enforce_node_consistency(&graph, &word_list, &mut domains);

        // Only revise the across slot against the down slot.
        establish_arc_consistency(&graph, &word_list, &mut domains, Some(vec![(0, 1)])).unwrap();

        assert_eq!(words_in(&domains, &word_list, 0), vec!["TEA", "CAT", "ACT"]);
        assert_eq!(domains.len(1), 4);

        // An empty starting set does nothing.
        let success =
            establish_arc_consistency(&graph, &word_list, &mut domains, Some(vec![])).unwrap();
        assert_eq!(success.revisions, 0);
    }
}
