use crate::identifier::Identifier;
use std::collections::{BTreeSet, HashSet};

/// In-memory frontier: the known set plus this process's attempted set
///
/// Both sets only grow. The engine's coordinating task is the sole owner;
/// workers never see this type.
#[derive(Debug, Clone, Default)]
pub struct FrontierState {
    /// Every identifier discovered so far, persisted after each round
    known: BTreeSet<Identifier>,

    /// Identifiers already dispatched in this process; never persisted
    attempted: HashSet<Identifier>,
}

impl FrontierState {
    /// Creates a frontier from a seed or resumed known set
    pub fn new(known: BTreeSet<Identifier>) -> Self {
        Self {
            known,
            attempted: HashSet::new(),
        }
    }

    /// Computes this round's work (`known - attempted`) and marks it attempted
    ///
    /// Returned in identifier order. An empty result means the fixed point
    /// has been reached.
    pub fn begin_round(&mut self) -> Vec<Identifier> {
        let work: Vec<Identifier> = self
            .known
            .iter()
            .filter(|id| !self.attempted.contains(*id))
            .cloned()
            .collect();

        self.attempted.extend(work.iter().cloned());
        work
    }

    /// Unions discoveries into the known set, returning how many were new
    pub fn absorb<'a, I>(&mut self, discovered: I) -> usize
    where
        I: IntoIterator<Item = &'a Identifier>,
    {
        discovered
            .into_iter()
            .filter(|id| self.known.insert((*id).clone()))
            .count()
    }

    /// The known set
    pub fn known(&self) -> &BTreeSet<Identifier> {
        &self.known
    }

    /// Number of known identifiers
    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    /// Number of identifiers dispatched in this process
    pub fn attempted_len(&self) -> usize {
        self.attempted.len()
    }

    /// Returns true if `id` was dispatched in this process
    pub fn was_attempted(&self, id: &Identifier) -> bool {
        self.attempted.contains(id)
    }
}
