use bit_set::BitSet;

use crate::grid_config::{ConstraintGraph, SlotId};
use crate::word_list::{WordId, WordList};

/// The words still admissible for each slot, indexed by `SlotId`. Filling only ever removes
/// words; nothing is added back except by restoring a snapshot taken earlier in the same solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    domains: Vec<BitSet>,
}

/// A saved copy of every domain, used to roll back per-branch propagation.
#[derive(Debug, Clone)]
pub struct DomainsSnapshot(Vec<BitSet>);

impl Domains {
    /// Seed every slot's domain with the entire word list.
    pub fn new(graph: &ConstraintGraph, word_list: &WordList) -> Domains {
        let full: BitSet = word_list.word_ids().collect();
        Domains { domains: graph.slot_ids().map(|_| full.clone()).collect() }
    }

    pub fn domain(&self, slot_id: SlotId) -> &BitSet {
        &self.domains[slot_id]
    }

    /// Iterate the words in a slot's domain in ascending id order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// Remove a word from a slot's domain, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    /// Narrow a slot's domain down to a single word.
    pub(crate) fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) {
        let domain = &mut self.domains[slot_id];
        domain.clear();
        domain.insert(word_id);
    }

    pub(crate) fn snapshot(&self) -> DomainsSnapshot {
        DomainsSnapshot(self.domains.clone())
    }

    pub(crate) fn restore(&mut self, snapshot: DomainsSnapshot) {
        self.domains = snapshot.0;
    }
}

#[cfg(test)]
mod tests {
    use crate::domains::Domains;
    use crate::grid_config::ConstraintGraph;
    use crate::word_list::WordList;

    #[test]
    fn test_domains_start_full_and_shrink() {
        let graph = ConstraintGraph::from_template("...\n.#.\n...").unwrap();
        let word_list = WordList::new(["CAT", "DOG", "EMU"]);
        let mut domains = Domains::new(&graph, &word_list);

        for slot_id in graph.slot_ids() {
            assert_eq!(domains.len(slot_id), 3);
        }

        assert!(domains.remove(1, 0));
        assert!(!domains.remove(1, 0));
        assert!(!domains.contains(1, 0));
        assert_eq!(domains.iter(1).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(domains.len(0), 3);

        domains.remove(1, 1);
        domains.remove(1, 2);
        assert!(domains.is_empty(1));
    }

    #[test]
    fn test_snapshot_restores_removed_words() {
        let graph = ConstraintGraph::from_template("..").unwrap();
        let word_list = WordList::new(["AB", "CD", "EF"]);
        let mut domains = Domains::new(&graph, &word_list);

        let snapshot = domains.snapshot();
        domains.restrict_to(0, 2);
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![2]);

        domains.restore(snapshot);
        assert_eq!(domains.len(0), 3);
    }
}
