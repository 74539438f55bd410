//! Grid filling by backtracking search. Before searching we make every slot node consistent and
//! then arc consistent (AC-3). The search itself picks slots with the minimum-remaining-values
//! heuristic (ties going to the slot with the most crossings) and tries words in
//! least-constraining-value order, undoing each choice that leads to a dead end.
//!
//! By default the search never touches the domains once it starts; it only grows and shrinks the
//! assignment. With `SolverConfig::maintain_arc_consistency` each choice is also propagated
//! through the domains, which are snapshotted first and restored if the branch fails.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use instant::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

use crate::arc_consistency::{
    enforce_node_consistency, establish_arc_consistency, Arc, ArcConsistencyResult,
};
use crate::config::SolverConfig;
use crate::domains::Domains;
use crate::grid_config::{ConstraintGraph, Slot, SlotId};
use crate::word_list::{WordId, WordList};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Number of search nodes at which a slot was selected.
    pub states: u64,
    /// Number of consistent choices that were later undone.
    pub backtracks: u64,
    /// Number of arcs revised, across every arc consistency pass.
    pub revisions: u64,
    pub duration: Duration,
}

/// A partial mapping from slot to word, indexed by `SlotId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<Option<WordId>>,
}

impl Assignment {
    /// An assignment with no words chosen.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { words: vec![None; slot_count] }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words[slot_id]
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.words[slot_id].is_some()
    }

    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        self.words[slot_id] = Some(word_id);
    }

    pub fn unassign(&mut self, slot_id: SlotId) {
        self.words[slot_id] = None;
    }

    /// The choices made so far, in slot id order.
    pub fn choices(&self) -> impl Iterator<Item = Choice> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| Choice { slot_id, word_id }))
    }
}

/// A struct representing the results of a successful fill. The assignment always covers every
/// slot.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    /// One choice per slot, in slot id order.
    pub choices: Vec<Choice>,
    pub assignment: BTreeMap<Slot, String>,
}

/// Why no fill exists. Either way the grid is unsatisfiable with this word list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// Propagation before the search emptied this slot's domain, so the search never ran.
    #[error("no words can fill slot {slot:?} consistently with its crossings")]
    ArcInconsistent { slot: Slot },
    /// The search tried every candidate without finding a complete, consistent assignment.
    #[error("exhausted every candidate without finding a fill")]
    Exhausted,
}

/// Owns the domains for a single fill of a constraint graph.
pub struct Filler<'a> {
    graph: &'a ConstraintGraph,
    word_list: &'a WordList,
    config: SolverConfig,
    domains: Domains,
    statistics: Statistics,
}

impl<'a> Filler<'a> {
    /// Create a filler with every slot's domain seeded from the whole word list.
    pub fn new(graph: &'a ConstraintGraph, word_list: &'a WordList, config: SolverConfig) -> Filler<'a> {
        Filler {
            graph,
            word_list,
            config,
            domains: Domains::new(graph, word_list),
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Remove words whose length doesn't match their slot.
    pub fn enforce_node_consistency(&mut self) -> usize {
        enforce_node_consistency(self.graph, self.word_list, &mut self.domains)
    }

    /// Make the domains arc consistent, starting from `arcs` or from every arc in the graph.
    pub fn ac3(&mut self, arcs: Option<Vec<Arc>>) -> ArcConsistencyResult {
        let result = establish_arc_consistency(self.graph, self.word_list, &mut self.domains, arcs);
        let revisions = match &result {
            Ok(success) => success.revisions,
            Err(failure) => failure.revisions,
        };
        self.statistics.revisions += revisions as u64;
        result
    }

    /// Does `assignment` give a word to every slot?
    pub fn assignment_complete(&self, assignment: &Assignment) -> bool {
        self.graph.slot_ids().all(|slot_id| assignment.is_assigned(slot_id))
    }

    /// Is `assignment` consistent: every word the right length, crossing words agreeing on their
    /// shared cell, and no word used twice anywhere in the grid?
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        let mut used_words: HashSet<WordId> = HashSet::new();

        for Choice { slot_id, word_id } in assignment.choices() {
            let word = self.word_list.word(word_id);

            if word.len() != self.graph.slot(slot_id).length {
                return false;
            }

            if !used_words.insert(word_id) {
                return false;
            }

            for &neighbor in self.graph.neighbors(slot_id) {
                let (Some(overlap), Some(neighbor_word_id)) =
                    (self.graph.overlap(slot_id, neighbor), assignment.get(neighbor))
                else {
                    continue;
                };

                let neighbor_word = self.word_list.word(neighbor_word_id);
                if word.glyphs.get(overlap.cell) != neighbor_word.glyphs.get(overlap.other_cell) {
                    return false;
                }
            }
        }

        true
    }

    /// Order the words in a slot's domain by how many words they would rule out of crossing
    /// slots' domains, fewest first. Ties keep word list order.
    pub fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        // For each crossing: (cell in this slot, size of the crossing domain, how many words in
        // the crossing domain have each glyph in the shared cell).
        let crossings: Vec<(usize, usize, HashMap<char, usize>)> = self
            .graph
            .neighbors(slot_id)
            .iter()
            .filter_map(|&neighbor| {
                let overlap = self.graph.overlap(slot_id, neighbor)?;
                let mut glyph_counts: HashMap<char, usize> = HashMap::new();
                for word_id in self.domains.iter(neighbor) {
                    if let Some(&glyph) = self.word_list.word(word_id).glyphs.get(overlap.other_cell) {
                        *glyph_counts.entry(glyph).or_insert(0) += 1;
                    }
                }
                Some((overlap.cell, self.domains.len(neighbor), glyph_counts))
            })
            .collect();

        let mut values: Vec<WordId> = self.domains.iter(slot_id).collect();
        values.sort_by_cached_key(|&word_id| {
            let word = self.word_list.word(word_id);
            let eliminated: usize = crossings
                .iter()
                .map(|(cell, domain_len, glyph_counts)| {
                    let compatible = word
                        .glyphs
                        .get(*cell)
                        .and_then(|glyph| glyph_counts.get(glyph))
                        .copied()
                        .unwrap_or(0);
                    domain_len - compatible
                })
                .sum();
            (eliminated, word_id)
        });

        values
    }

    /// Pick the next slot to fill: fewest remaining words, then most crossings, then lowest id.
    /// Returns `None` once every slot is assigned.
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<SlotId> {
        self.graph
            .slot_ids()
            .filter(|&slot_id| !assignment.is_assigned(slot_id))
            .min_by_key(|&slot_id| {
                (self.domains.len(slot_id), Reverse(self.graph.neighbors(slot_id).len()))
            })
    }

    /// Extend `assignment` to a complete, consistent assignment if possible. On success the
    /// assignment is left complete; on failure it's left exactly as it was passed in.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> bool {
        if self.assignment_complete(assignment) {
            return true;
        }

        let Some(slot_id) = self.select_unassigned_variable(assignment) else {
            return true;
        };
        self.statistics.states += 1;

        for word_id in self.order_domain_values(slot_id) {
            assignment.assign(slot_id, word_id);

            if self.consistent(assignment) {
                trace!(slot_id, word = %self.word_list.word(word_id).string, "trying word");

                if self.extend_with_choice(assignment, Choice { slot_id, word_id }) {
                    return true;
                }

                self.statistics.backtracks += 1;
                trace!(slot_id, word = %self.word_list.word(word_id).string, "backtracking");
            }

            assignment.unassign(slot_id);
        }

        false
    }

    /// Recurse on an assignment that already includes `choice`. When maintaining arc
    /// consistency, the choice is propagated through the domains first and the domains are
    /// rolled back if the branch fails.
    fn extend_with_choice(&mut self, assignment: &mut Assignment, choice: Choice) -> bool {
        if !self.config.maintain_arc_consistency {
            return self.backtrack(assignment);
        }

        let snapshot = self.domains.snapshot();
        self.domains.restrict_to(choice.slot_id, choice.word_id);

        let arcs: Vec<Arc> =
            self.graph.neighbors(choice.slot_id).iter().map(|&z| (z, choice.slot_id)).collect();

        let found = self.ac3(Some(arcs)).is_ok() && self.backtrack(assignment);
        if !found {
            self.domains.restore(snapshot);
        }

        found
    }

    /// Enforce node and arc consistency, and then search for a complete assignment.
    #[instrument(level = "debug", skip_all)]
    pub fn fill(&mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();
        info!(
            slots = self.graph.slot_count(),
            words = self.word_list.len(),
            maintain_arc_consistency = self.config.maintain_arc_consistency,
            "starting fill"
        );

        self.enforce_node_consistency();

        if let Err(failure) = self.ac3(None) {
            self.statistics.duration = start.elapsed();
            let slot = *self.graph.slot(failure.slot_id);
            info!(?slot, statistics = ?self.statistics, "no fill: a slot has no consistent words");
            return Err(FillFailure::ArcInconsistent { slot });
        }

        let mut assignment = Assignment::new(self.graph.slot_count());
        let found = self.backtrack(&mut assignment);
        self.statistics.duration = start.elapsed();

        if !found {
            info!(statistics = ?self.statistics, "no fill: search exhausted");
            return Err(FillFailure::Exhausted);
        }

        debug_assert!(self.consistent(&assignment));
        info!(statistics = ?self.statistics, "found fill");

        let choices: Vec<Choice> = assignment.choices().collect();
        let assignment: BTreeMap<Slot, String> = choices
            .iter()
            .map(|choice| {
                (*self.graph.slot(choice.slot_id), self.word_list.word(choice.word_id).string.clone())
            })
            .collect();
        debug!(words = assignment.len(), "collected fill");

        Ok(FillSuccess { statistics: self.statistics.clone(), choices, assignment })
    }
}

/// Search for a valid fill of `graph` using words from `word_list`.
pub fn find_fill(
    graph: &ConstraintGraph,
    word_list: &WordList,
    config: SolverConfig,
) -> Result<FillSuccess, FillFailure> {
    Filler::new(graph, word_list, config).fill()
}
