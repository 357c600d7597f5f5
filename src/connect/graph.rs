// Undirected "who fought whom" graph built from bout records.

use std::collections::HashMap;

use super::identity::{BoutRecord, FighterId};

/// Simple undirected graph over fighter identities.
///
/// Vertices are interned to dense indices in order of first appearance and
/// each adjacency list keeps the order in which opponents were first seen,
/// so iteration order is a deterministic function of the input sequence.
#[derive(Debug, Clone, Default)]
pub struct FightGraph {
    index: HashMap<FighterId, usize>,
    fighters: Vec<FighterId>,
    adjacency: Vec<Vec<usize>>,
}

impl FightGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a full bout history.
    ///
    /// Repeated bouts between the same pair collapse to one edge. Self-paired
    /// records are skipped and never produce a vertex or a self-loop.
    pub fn build<'a, I>(bouts: I) -> Self
    where
        I: IntoIterator<Item = &'a BoutRecord>,
    {
        let mut graph = Self::new();
        let mut skipped = 0usize;
        for bout in bouts {
            if !graph.add_bout(bout) {
                skipped += 1;
            }
        }
        tracing::debug!(
            fighters = graph.fighter_count(),
            edges = graph.edge_count(),
            skipped,
            "Built fight graph"
        );
        graph
    }

    /// Add one bout. Returns false if the record was self-paired and ignored.
    pub fn add_bout(&mut self, bout: &BoutRecord) -> bool {
        if bout.is_self_paired() {
            tracing::debug!(fighter = %bout.fighter_a, "Skipping self-paired bout");
            return false;
        }
        let a = self.intern(&bout.fighter_a);
        let b = self.intern(&bout.fighter_b);
        if !self.adjacency[a].contains(&b) {
            self.adjacency[a].push(b);
            self.adjacency[b].push(a);
        }
        true
    }

    fn intern(&mut self, id: &FighterId) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.fighters.len();
        self.index.insert(id.clone(), idx);
        self.fighters.push(id.clone());
        self.adjacency.push(Vec::new());
        idx
    }

    pub fn contains(&self, id: &FighterId) -> bool {
        self.index.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty()
    }

    pub fn fighter_count(&self) -> usize {
        self.fighters.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// All identities, in order of first appearance.
    pub fn fighters(&self) -> impl Iterator<Item = &FighterId> {
        self.fighters.iter()
    }

    /// Distinct opponents of `id`, in adjacency order. Empty if `id` is absent.
    pub fn opponents<'a>(&'a self, id: &FighterId) -> impl Iterator<Item = &'a FighterId> + 'a {
        let neighbors: &'a [usize] = self
            .index
            .get(id)
            .map(|&idx| self.adjacency[idx].as_slice())
            .unwrap_or(&[]);
        neighbors.iter().map(move |&n| &self.fighters[n])
    }

    pub fn degree(&self, id: &FighterId) -> usize {
        self.index
            .get(id)
            .map(|&idx| self.adjacency[idx].len())
            .unwrap_or(0)
    }

    pub fn are_opponents(&self, a: &FighterId, b: &FighterId) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.adjacency[ia].contains(&ib),
            _ => false,
        }
    }

    // ── Index-level access for traversal ─────────────────────────────

    pub(crate) fn index_of(&self, id: &FighterId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn fighter_at(&self, idx: usize) -> &FighterId {
        &self.fighters[idx]
    }

    pub(crate) fn neighbors_of(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }
}
