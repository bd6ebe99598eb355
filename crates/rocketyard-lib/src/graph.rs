//! Graph traversal shared by the rocket assembler and the relation validators.
//!
//! Both sides need the same three questions answered over string-keyed graphs:
//! which nodes are reachable from a start node, whether following a single
//! parent pointer ever returns to the origin, and where a directed graph
//! closes a cycle. Keeping them here means the assembler's cycle rejection and
//! the tech-tree/celestial checks cannot drift apart.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Breadth-first reachability from `start`. The result includes `start`.
pub fn collect_reachable<N, F, I>(start: N, mut neighbours: F) -> HashSet<N>
where
    N: Clone + Eq + Hash,
    F: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(start.clone());
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in neighbours(&current) {
            if visited.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }

    visited
}

/// Walk the single-parent chain starting at `origin` and report whether it
/// comes back to `origin`. Chains that run into an unrelated loop terminate
/// without being attributed to `origin`.
pub fn parent_chain_returns<N, F>(origin: &N, mut parent_of: F) -> bool
where
    N: Clone + Eq + Hash,
    F: FnMut(&N) -> Option<N>,
{
    let mut visited = HashSet::new();
    visited.insert(origin.clone());
    let mut current = origin.clone();

    while let Some(parent) = parent_of(&current) {
        if &parent == origin {
            return true;
        }
        if !visited.insert(parent.clone()) {
            return false;
        }
        current = parent;
    }

    false
}

/// A directed edge `from -> to` that closed a cycle during depth-first search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleEdge<N> {
    pub from: N,
    pub to: N,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Iterative white/gray/black depth-first search over `nodes`.
///
/// Returns one [`CycleEdge`] for every back edge found, in discovery order;
/// `from` is the node at which the cycle is closed. Neighbours not present in
/// `nodes` are ignored, so dangling references are left to the caller.
pub fn find_cycles<N, F, I>(nodes: &[N], mut neighbours: F) -> Vec<CycleEdge<N>>
where
    N: Clone + Eq + Hash,
    F: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut marks: HashMap<N, Mark> = nodes.iter().map(|n| (n.clone(), Mark::White)).collect();
    let mut cycles = Vec::new();

    for root in nodes {
        if marks.get(root) != Some(&Mark::White) {
            continue;
        }

        // Each frame holds a node and the neighbours still to visit.
        let mut stack: Vec<(N, std::vec::IntoIter<N>)> = Vec::new();
        marks.insert(root.clone(), Mark::Gray);
        let children: Vec<N> = neighbours(root).into_iter().collect();
        stack.push((root.clone(), children.into_iter()));

        while let Some((node, pending)) = stack.last_mut() {
            match pending.next() {
                Some(next) => match marks.get(&next).copied() {
                    Some(Mark::White) => {
                        marks.insert(next.clone(), Mark::Gray);
                        let children: Vec<N> = neighbours(&next).into_iter().collect();
                        stack.push((next, children.into_iter()));
                    }
                    Some(Mark::Gray) => cycles.push(CycleEdge {
                        from: node.clone(),
                        to: next,
                    }),
                    Some(Mark::Black) | None => {}
                },
                None => {
                    let node = node.clone();
                    marks.insert(node, Mark::Black);
                    stack.pop();
                }
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(edges: &[(&'static str, &'static str)]) -> HashMap<&'static str, Vec<&'static str>> {
        let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for (from, to) in edges {
            map.entry(*from).or_default().push(*to);
        }
        map
    }

    #[test]
    fn reachable_includes_start_and_descendants() {
        let adj = adjacency(&[("a", "b"), ("b", "c"), ("d", "a")]);
        let reached = collect_reachable("a", |n| adj.get(n).cloned().unwrap_or_default());
        assert_eq!(reached, HashSet::from(["a", "b", "c"]));
    }

    #[test]
    fn parent_chain_detects_two_cycle() {
        let parents = HashMap::from([("a", "b"), ("b", "a"), ("c", "a")]);
        let parent_of = |n: &&str| parents.get(n).copied();
        assert!(parent_chain_returns(&"a", parent_of));
        assert!(parent_chain_returns(&"b", parent_of));
        assert!(!parent_chain_returns(&"c", parent_of));
    }

    #[test]
    fn parent_chain_ends_at_root() {
        let parents = HashMap::from([("moon", "planet"), ("planet", "sun")]);
        assert!(!parent_chain_returns(&"moon", |n: &&str| parents.get(n).copied()));
    }

    #[test]
    fn find_cycles_reports_closing_node() {
        let adj = adjacency(&[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")]);
        let nodes = ["a", "b", "c", "d"];
        let cycles = find_cycles(&nodes, |n| adj.get(n).cloned().unwrap_or_default());
        assert_eq!(cycles, vec![CycleEdge { from: "c", to: "a" }]);
    }

    #[test]
    fn find_cycles_accepts_diamonds() {
        let adj = adjacency(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        let nodes = ["a", "b", "c", "d"];
        assert!(find_cycles(&nodes, |n| adj.get(n).cloned().unwrap_or_default()).is_empty());
    }

    #[test]
    fn find_cycles_flags_self_loop_and_ignores_dangling() {
        let adj = adjacency(&[("a", "a"), ("b", "zzz")]);
        let nodes = ["a", "b"];
        let cycles = find_cycles(&nodes, |n| adj.get(n).cloned().unwrap_or_default());
        assert_eq!(cycles, vec![CycleEdge { from: "a", to: "a" }]);
    }
}
