// Fighter relationship graph engine: graph building, shortest paths and
// puzzle pair generation, wired to the bout and profile collaborators.

mod graph;
mod identity;
mod path;
mod source;
mod walk;

pub use graph::FightGraph;
pub use identity::{BoutRecord, FighterId};
pub use path::shortest_path;
pub use source::{BoutSource, FightStore, FighterResolver, MemoryStore, SourceError};
pub use walk::{
    generate_pair, random_walk, AttemptFailure, GenerationFailed, PairSettings, PuzzlePair,
    DEFAULT_MAX_ATTEMPTS, MAX_WALK_LENGTH, MIN_WALK_LENGTH,
};

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::fighter::FighterProfile;
use crate::metrics;

/// Outcome of an engine call that produced no result.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("no connection between {start} and {end}")]
    NotFound { start: FighterId, end: FighterId },

    #[error("fighter not found: {0}")]
    UnknownFighter(FighterId),

    #[error("bout history unavailable: {0}")]
    SourceUnavailable(#[source] SourceError),

    #[error(transparent)]
    GenerationFailed(#[from] GenerationFailed),

    #[error("graph task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConnectError {
    /// Missing path, missing profile and an unreachable bout source during a
    /// path search are all reported to callers as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConnectError::NotFound { .. }
                | ConnectError::UnknownFighter(_)
                | ConnectError::SourceUnavailable(_)
        )
    }
}

/// Entry point used by the HTTP layer.
///
/// Every call lists the bout history and builds its own graph; nothing is
/// shared or mutated between calls. Graph construction and traversal run on
/// the blocking pool.
pub struct ConnectEngine<S: ?Sized> {
    store: Arc<S>,
    settings: PairSettings,
}

impl<S: ?Sized> Clone for ConnectEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            settings: self.settings,
        }
    }
}

fn build_graph(bouts: &[BoutRecord]) -> FightGraph {
    let started = Instant::now();
    let graph = FightGraph::build(bouts);
    metrics::GRAPH_BUILDS_TOTAL.inc();
    metrics::GRAPH_BUILD_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
    graph
}

impl<S> ConnectEngine<S>
where
    S: BoutSource + FighterResolver + ?Sized,
{
    pub fn new(store: Arc<S>, settings: PairSettings) -> Self {
        Self { store, settings }
    }

    async fn list_bouts(&self) -> Result<Vec<BoutRecord>, SourceError> {
        self.store.list_bouts().await.map_err(|e| {
            tracing::error!("Failed to list bouts: {e}");
            e
        })
    }

    /// Shortest chain of opponents from `start` to `end`, as full profiles in
    /// path order.
    pub async fn shortest_path(
        &self,
        start: &FighterId,
        end: &FighterId,
    ) -> Result<Vec<FighterProfile>, ConnectError> {
        let bouts = self
            .list_bouts()
            .await
            .map_err(ConnectError::SourceUnavailable)?;

        let (from, to) = (start.clone(), end.clone());
        let found = tokio::task::spawn_blocking(move || {
            let graph = build_graph(&bouts);
            shortest_path(&graph, &from, &to)
        })
        .await?;

        let Some(path) = found else {
            metrics::PATH_SEARCHES_TOTAL.with_label_values(&["not_found"]).inc();
            return Err(ConnectError::NotFound {
                start: start.clone(),
                end: end.clone(),
            });
        };
        metrics::PATH_SEARCHES_TOTAL.with_label_values(&["found"]).inc();
        tracing::debug!(from = %start, to = %end, hops = path.len() - 1, "Found path");

        self.materialize(&path).await
    }

    /// Resolve every identity concurrently; the result keeps path order.
    async fn materialize(&self, path: &[FighterId]) -> Result<Vec<FighterProfile>, ConnectError> {
        let lookups = join_all(path.iter().map(|id| self.store.resolve(id))).await;

        let mut profiles = Vec::with_capacity(path.len());
        for (id, lookup) in path.iter().zip(lookups) {
            match lookup {
                Ok(Some(profile)) => profiles.push(profile),
                Ok(None) => return Err(ConnectError::UnknownFighter(id.clone())),
                Err(e) => {
                    tracing::error!(fighter = %id, "Profile lookup failed: {e}");
                    return Err(ConnectError::UnknownFighter(id.clone()));
                }
            }
        }
        Ok(profiles)
    }

    /// A fresh "connect the dots" pair, start first.
    ///
    /// Every failure, including an unreachable bout source, is reported as
    /// `GenerationFailed` so callers know a retry may succeed.
    pub async fn generate_puzzle_pair(&self) -> Result<(FighterProfile, FighterProfile), ConnectError> {
        let bouts = match self.list_bouts().await {
            Ok(bouts) => bouts,
            Err(e) => {
                return Err(generation_failed(GenerationFailed {
                    attempts: 0,
                    last_failure: Some(AttemptFailure::SourceUnavailable(e.to_string())),
                }))
            }
        };

        let (graph, bouts) = tokio::task::spawn_blocking(move || (build_graph(&bouts), bouts)).await?;
        let mut rng = StdRng::from_entropy();

        match generate_pair(&graph, &bouts, self.store.as_ref(), &mut rng, &self.settings).await {
            Ok(pair) => {
                metrics::PUZZLE_PAIRS_TOTAL.with_label_values(&["generated"]).inc();
                metrics::PAIR_ATTEMPTS.observe(pair.attempts as f64);
                tracing::debug!(
                    start = %pair.start.id(),
                    end = %pair.end.id(),
                    attempts = pair.attempts,
                    "Generated puzzle pair"
                );
                Ok((pair.start, pair.end))
            }
            Err(failed) => Err(generation_failed(failed)),
        }
    }
}

fn generation_failed(failed: GenerationFailed) -> ConnectError {
    metrics::PUZZLE_PAIRS_TOTAL.with_label_values(&["failed"]).inc();
    metrics::PAIR_ATTEMPTS.observe(failed.attempts as f64);
    tracing::warn!(
        attempts = failed.attempts,
        last_failure = ?failed.last_failure,
        "Puzzle pair generation failed"
    );
    failed.into()
}
