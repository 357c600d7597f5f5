// Random-walk puzzle generation for "connect the dots".
//
// An attempt seeds from a random bout, walks a few random opponent hops and
// keeps the two endpoints. Any failing step throws the whole attempt away;
// the attempt budget bounds the total work.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::graph::FightGraph;
use super::identity::{BoutRecord, FighterId};
use super::source::FighterResolver;
use crate::fighter::FighterProfile;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const MIN_WALK_LENGTH: usize = 3;
pub const MAX_WALK_LENGTH: usize = 6;

/// Tuning for the pair generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSettings {
    /// Attempts before giving up.
    pub max_attempts: u32,
    /// Shortest walk, in edges.
    pub min_walk: usize,
    /// Longest walk, in edges (inclusive).
    pub max_walk: usize,
}

impl Default for PairSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_walk: MIN_WALK_LENGTH,
            max_walk: MAX_WALK_LENGTH,
        }
    }
}

impl PairSettings {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    fn draw_walk_length<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let lo = self.min_walk.min(self.max_walk);
        let hi = self.min_walk.max(self.max_walk);
        rng.gen_range(lo..=hi)
    }
}

/// Two distinct fighters joined by the walk that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzlePair {
    pub start: FighterProfile,
    pub end: FighterProfile,
    /// Attempt number that succeeded, starting at 1.
    pub attempts: u32,
}

/// Why a single attempt was thrown away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// No bouts to seed from.
    EmptySource,
    StartUnresolved(FighterId),
    /// The walk reached a fighter without recorded opponents.
    DeadEnd(FighterId),
    EndUnresolved(FighterId),
    /// The walk returned to where it started.
    ClosedWalk(FighterId),
    /// Profile lookup itself failed.
    Resolver(String),
    /// The bout history could not be listed; nothing was attempted.
    SourceUnavailable(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::EmptySource => write!(f, "no bouts recorded"),
            AttemptFailure::StartUnresolved(id) => write!(f, "start fighter '{id}' has no profile"),
            AttemptFailure::DeadEnd(id) => write!(f, "fighter '{id}' has no recorded opponents"),
            AttemptFailure::EndUnresolved(id) => write!(f, "end fighter '{id}' has no profile"),
            AttemptFailure::ClosedWalk(id) => write!(f, "walk returned to '{id}'"),
            AttemptFailure::Resolver(msg) => write!(f, "profile lookup failed: {msg}"),
            AttemptFailure::SourceUnavailable(msg) => write!(f, "bout history unavailable: {msg}"),
        }
    }
}

/// The attempt budget ran out without a usable pair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not generate a puzzle pair after {attempts} attempts")]
pub struct GenerationFailed {
    pub attempts: u32,
    pub last_failure: Option<AttemptFailure>,
}

/// Take `steps` uniformly random opponent hops from `start` and return where
/// the walk ends. Opponents are drawn from the set of distinct opponents, so
/// rematches do not weight the choice.
pub fn random_walk<R: Rng + ?Sized>(
    graph: &FightGraph,
    start: &FighterId,
    steps: usize,
    rng: &mut R,
) -> Result<FighterId, AttemptFailure> {
    let mut current = graph
        .index_of(start)
        .ok_or_else(|| AttemptFailure::DeadEnd(start.clone()))?;
    for _ in 0..steps {
        current = *graph
            .neighbors_of(current)
            .choose(rng)
            .ok_or_else(|| AttemptFailure::DeadEnd(graph.fighter_at(current).clone()))?;
    }
    Ok(graph.fighter_at(current).clone())
}

/// Generate a solvable puzzle pair.
///
/// `bouts` must be the history `graph` was built from; seeding from a bout
/// guarantees the start fighter has at least one opponent. Returns
/// `GenerationFailed` after `settings.max_attempts` failed attempts, or
/// immediately (with zero attempts) when `bouts` is empty.
pub async fn generate_pair<S, R>(
    graph: &FightGraph,
    bouts: &[BoutRecord],
    resolver: &S,
    rng: &mut R,
    settings: &PairSettings,
) -> Result<PuzzlePair, GenerationFailed>
where
    S: FighterResolver + ?Sized,
    R: Rng + ?Sized,
{
    if bouts.is_empty() {
        return Err(GenerationFailed {
            attempts: 0,
            last_failure: Some(AttemptFailure::EmptySource),
        });
    }

    let mut last_failure = None;
    for attempt in 1..=settings.max_attempts {
        match attempt_pair(graph, bouts, resolver, rng, settings).await {
            Ok((start, end)) => {
                return Ok(PuzzlePair {
                    start,
                    end,
                    attempts: attempt,
                })
            }
            Err(failure) => {
                if let AttemptFailure::Resolver(msg) = &failure {
                    tracing::warn!(attempt, "Profile lookup failed during pair generation: {msg}");
                } else {
                    tracing::debug!(attempt, reason = %failure, "Pair attempt failed");
                }
                last_failure = Some(failure);
            }
        }
    }

    Err(GenerationFailed {
        attempts: settings.max_attempts,
        last_failure,
    })
}

async fn attempt_pair<S, R>(
    graph: &FightGraph,
    bouts: &[BoutRecord],
    resolver: &S,
    rng: &mut R,
    settings: &PairSettings,
) -> Result<(FighterProfile, FighterProfile), AttemptFailure>
where
    S: FighterResolver + ?Sized,
    R: Rng + ?Sized,
{
    // Walk before any lookup: an unresolvable start on a closed walk is
    // reported as ClosedWalk rather than StartUnresolved.
    let (start, end) = {
        let bout = bouts.choose(rng).ok_or(AttemptFailure::EmptySource)?;
        let start = bout.side(rng.gen_bool(0.5)).clone();
        let steps = settings.draw_walk_length(rng);
        let end = random_walk(graph, &start, steps, rng)?;
        (start, end)
    };

    if start == end {
        return Err(AttemptFailure::ClosedWalk(start));
    }

    // Independent lookups; resolve both endpoints at once.
    let (start_profile, end_profile) = futures::join!(resolver.resolve(&start), resolver.resolve(&end));

    let start_profile = start_profile
        .map_err(|e| AttemptFailure::Resolver(e.to_string()))?
        .ok_or_else(|| AttemptFailure::StartUnresolved(start.clone()))?;
    let end_profile = end_profile
        .map_err(|e| AttemptFailure::Resolver(e.to_string()))?
        .ok_or_else(|| AttemptFailure::EndUnresolved(end.clone()))?;

    Ok((start_profile, end_profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::path::shortest_path;
    use crate::connect::source::{MemoryStore, SourceError};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(name: &str) -> FighterId {
        FighterId::from_full_name(name)
    }

    /// Knows every fighter's bouts but no profiles.
    struct EmptyRoster {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl FighterResolver for EmptyRoster {
        async fn resolve(&self, _id: &FighterId) -> Result<Option<FighterProfile>, SourceError> {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        }
    }

    struct BrokenRoster;

    #[async_trait]
    impl FighterResolver for BrokenRoster {
        async fn resolve(&self, _id: &FighterId) -> Result<Option<FighterProfile>, SourceError> {
            Err(SourceError::Unavailable("connection reset".into()))
        }
    }

    fn chain_store(len: usize) -> MemoryStore {
        let names: Vec<String> = (0..len).map(|i| format!("Fighter{i} Chain")).collect();
        let pairs: Vec<(&str, &str)> = names
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect();
        MemoryStore::from_pairs(&pairs)
    }

    #[test]
    fn test_walk_on_single_edge_alternates() {
        let graph = FightGraph::build(&[BoutRecord::new(id("A"), id("B"))]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_walk(&graph, &id("A"), 3, &mut rng).unwrap(), id("B"));
        assert_eq!(random_walk(&graph, &id("A"), 4, &mut rng).unwrap(), id("A"));
    }

    #[test]
    fn test_walk_zero_steps_stays_put() {
        let graph = FightGraph::build(&[BoutRecord::new(id("A"), id("B"))]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_walk(&graph, &id("A"), 0, &mut rng).unwrap(), id("A"));
    }

    #[test]
    fn test_walk_from_absent_fighter_is_dead_end() {
        let graph = FightGraph::build(&[BoutRecord::new(id("A"), id("B"))]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            random_walk(&graph, &id("Z"), 3, &mut rng),
            Err(AttemptFailure::DeadEnd(id("Z")))
        );
    }

    #[test]
    fn test_walk_stays_on_edges() {
        let store = chain_store(12);
        let graph = FightGraph::build(store.bouts());
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let start = id("Fighter5 Chain");
            let end = random_walk(&graph, &start, 4, &mut rng).unwrap();
            let path = shortest_path(&graph, &start, &end).unwrap();
            assert!(path.len() - 1 <= 4);
        }
    }

    #[test]
    fn test_walk_length_drawn_within_bounds() {
        let settings = PairSettings::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let len = settings.draw_walk_length(&mut rng);
            assert!((MIN_WALK_LENGTH..=MAX_WALK_LENGTH).contains(&len));
        }
        let reversed = PairSettings {
            max_attempts: 1,
            min_walk: 5,
            max_walk: 4,
        };
        for _ in 0..50 {
            let len = reversed.draw_walk_length(&mut rng);
            assert!(len == 4 || len == 5);
        }
    }

    #[tokio::test]
    async fn test_generated_pairs_are_distinct_and_connected() {
        let store = chain_store(20);
        let graph = FightGraph::build(store.bouts());
        let settings = PairSettings::with_max_attempts(50);
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..100 {
            let pair = generate_pair(&graph, store.bouts(), &store, &mut rng, &settings)
                .await
                .unwrap();
            assert_ne!(pair.start.id(), pair.end.id());
            assert!(pair.attempts >= 1 && pair.attempts <= settings.max_attempts);
            let path = shortest_path(&graph, &pair.start.id(), &pair.end.id()).unwrap();
            assert!(path.len() - 1 <= MAX_WALK_LENGTH);
        }
    }

    #[tokio::test]
    async fn test_unresolvable_roster_fails_within_budget() {
        let store = chain_store(20);
        let graph = FightGraph::build(store.bouts());
        let roster = EmptyRoster {
            lookups: AtomicUsize::new(0),
        };
        let settings = PairSettings::with_max_attempts(10);
        let mut rng = StdRng::seed_from_u64(5);

        let err = generate_pair(&graph, store.bouts(), &roster, &mut rng, &settings)
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 10);
        assert!(err.last_failure.is_some());
        assert!(roster.lookups.load(Ordering::Relaxed) <= 20);
    }

    #[tokio::test]
    async fn test_resolver_errors_are_retried_then_reported() {
        let store = chain_store(10);
        let graph = FightGraph::build(store.bouts());
        let settings = PairSettings::with_max_attempts(4);
        let mut rng = StdRng::seed_from_u64(11);

        let err = generate_pair(&graph, store.bouts(), &BrokenRoster, &mut rng, &settings)
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 4);
        assert!(matches!(
            err.last_failure,
            Some(AttemptFailure::Resolver(_)) | Some(AttemptFailure::ClosedWalk(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_end_profile_retries() {
        // Two-fighter world with one profile missing: every open walk ends on
        // or starts from the missing fighter, so nothing can succeed.
        let mut store = MemoryStore::from_pairs(&[("A", "B")]);
        store.remove_profile(&id("B"));
        let graph = FightGraph::build(store.bouts());
        let settings = PairSettings::with_max_attempts(6);
        let mut rng = StdRng::seed_from_u64(8);

        let err = generate_pair(&graph, store.bouts(), &store, &mut rng, &settings)
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 6);
        assert!(matches!(
            err.last_failure,
            Some(AttemptFailure::StartUnresolved(_))
                | Some(AttemptFailure::EndUnresolved(_))
                | Some(AttemptFailure::ClosedWalk(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_history_fails_immediately() {
        let store = MemoryStore::new();
        let graph = FightGraph::build(store.bouts());
        let mut rng = StdRng::seed_from_u64(0);

        let err = generate_pair(&graph, store.bouts(), &store, &mut rng, &PairSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 0);
        assert_eq!(err.last_failure, Some(AttemptFailure::EmptySource));
    }

    #[tokio::test]
    async fn test_self_paired_seed_bout_is_a_dead_end() {
        let mut store = MemoryStore::new();
        store.add_profile(FighterProfile::named(&id("Royce")));
        store.add_bout(BoutRecord::new(id("Royce"), id("Royce")));
        let graph = FightGraph::build(store.bouts());
        let mut rng = StdRng::seed_from_u64(0);

        let err = generate_pair(&graph, store.bouts(), &store, &mut rng, &PairSettings::with_max_attempts(3))
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_failure, Some(AttemptFailure::DeadEnd(id("Royce"))));
    }

    #[tokio::test]
    async fn test_zero_budget_reports_failure() {
        let store = chain_store(5);
        let graph = FightGraph::build(store.bouts());
        let mut rng = StdRng::seed_from_u64(0);

        let err = generate_pair(&graph, store.bouts(), &store, &mut rng, &PairSettings::with_max_attempts(0))
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 0);
        assert_eq!(err.last_failure, None);
    }
}
