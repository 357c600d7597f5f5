// Breadth-first shortest path between two fighters.

use std::collections::VecDeque;

use super::graph::FightGraph;
use super::identity::FighterId;

/// Find a minimum-edge path from `start` to `end`, both endpoints included.
///
/// Returns `None` when either endpoint is missing from the graph or when the
/// two sit in different components. A vertex is marked visited as soon as it
/// is enqueued, so each vertex enters the queue once and the first path to
/// reach it is a shortest one. Ties follow adjacency order.
pub fn shortest_path(graph: &FightGraph, start: &FighterId, end: &FighterId) -> Option<Vec<FighterId>> {
    let source = graph.index_of(start)?;

    let n = graph.fighter_count();
    let mut visited = vec![false; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();

    visited[source] = true;
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        if graph.fighter_at(current) == end {
            return Some(reconstruct(graph, &parent, current));
        }
        for &next in graph.neighbors_of(current) {
            if !visited[next] {
                visited[next] = true;
                parent[next] = Some(current);
                queue.push_back(next);
            }
        }
    }

    None
}

fn reconstruct(graph: &FightGraph, parent: &[Option<usize>], target: usize) -> Vec<FighterId> {
    let mut path = vec![graph.fighter_at(target).clone()];
    let mut cursor = target;
    while let Some(prev) = parent[cursor] {
        path.push(graph.fighter_at(prev).clone());
        cursor = prev;
    }
    path.reverse();
    path
}
