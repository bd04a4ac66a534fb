use std::collections::{BTreeSet, HashSet, VecDeque};

use super::{DependencyGraph, EdgeDirection};

impl DependencyGraph {
    /// Every node reachable from `start` following `direction`, excluding `start`
    ///
    /// Unknown nodes reach nothing. Each node is expanded once, so cycles terminate.
    pub fn reachable(&self, start: &str, direction: EdgeDirection) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        if !self.contains_node(start) {
            return reached;
        }

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(start);
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            for next in self.neighbors(node, direction) {
                if visited.insert(next) {
                    reached.insert(next.to_string());
                    stack.push(next);
                }
            }
        }

        reached
    }

    /// Nodes reachable in at most `max_depth` hops, excluding `start`
    ///
    /// Breadth-first, level by level; stops early when a level adds nothing.
    pub fn reachable_within(
        &self,
        start: &str,
        direction: EdgeDirection,
        max_depth: usize,
    ) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        if !self.contains_node(start) {
            return reached;
        }

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(start);
        let mut frontier = vec![start];

        for _ in 0..max_depth {
            let mut next_level = Vec::new();
            for node in frontier {
                for next in self.neighbors(node, direction) {
                    if visited.insert(next) {
                        reached.insert(next.to_string());
                        next_level.push(next);
                    }
                }
            }
            if next_level.is_empty() {
                break;
            }
            frontier = next_level;
        }

        reached
    }

    /// Descendants (forward reachability)
    pub fn descendants(&self, id: &str) -> BTreeSet<String> {
        self.reachable(id, EdgeDirection::Outgoing)
    }

    /// Ancestors (backward reachability)
    pub fn ancestors(&self, id: &str) -> BTreeSet<String> {
        self.reachable(id, EdgeDirection::Incoming)
    }

    /// Simple paths from `source` to `target`, at most `max_paths` of them
    ///
    /// Paths come out in depth-first order over successors in edge order.
    /// The search only enters nodes that can still reach `target`, which
    /// keeps dead branches out of the enumeration. A path from a node to
    /// itself is not reported.
    pub fn simple_paths(&self, source: &str, target: &str, max_paths: usize) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        if max_paths == 0
            || source == target
            || !self.contains_node(source)
            || !self.contains_node(target)
        {
            return paths;
        }

        let can_reach = self.ancestors(target);
        if !can_reach.contains(source) {
            return paths;
        }

        struct Frame<'g> {
            children: Vec<&'g str>,
            next: usize,
        }

        let mut path: Vec<&str> = vec![source];
        let mut on_path: HashSet<&str> = HashSet::from([source]);
        let mut stack = vec![Frame {
            children: self.successors(source),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.children.len() {
                stack.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(done);
                }
                continue;
            }

            let child = frame.children[frame.next];
            frame.next += 1;

            if child == target {
                let mut found: Vec<String> = path.iter().map(|s| s.to_string()).collect();
                found.push(target.to_string());
                paths.push(found);
                if paths.len() >= max_paths {
                    break;
                }
                continue;
            }

            if on_path.contains(child) || !can_reach.contains(child) {
                continue;
            }

            path.push(child);
            on_path.insert(child);
            stack.push(Frame {
                children: self.successors(child),
                next: 0,
            });
        }

        paths
    }

    /// Cycles found by depth-first search with a recursion stack
    ///
    /// Each back edge yields one cycle, listed from the node it returns to.
    /// A self-reference yields a single-node cycle. Roots are tried in sorted
    /// order so the result is stable for a given graph.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut seen_cycles: HashSet<Vec<String>> = HashSet::new();
        let mut visited: HashSet<&str> = HashSet::new();

        for root in self.nodes() {
            if visited.contains(root) {
                continue;
            }
            visited.insert(root);

            let mut path: Vec<&str> = vec![root];
            let mut on_stack: HashSet<&str> = HashSet::from([root]);
            let mut stack: Vec<(Vec<&str>, usize)> = vec![(self.successors(root), 0)];

            while let Some((children, next)) = stack.last_mut() {
                if *next >= children.len() {
                    stack.pop();
                    if let Some(done) = path.pop() {
                        on_stack.remove(done);
                    }
                    continue;
                }

                let child = children[*next];
                *next += 1;

                if on_stack.contains(child) {
                    if let Some(start) = path.iter().position(|n| *n == child) {
                        let cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                        if seen_cycles.insert(canonical_rotation(&cycle)) {
                            cycles.push(cycle);
                        }
                    }
                } else if visited.insert(child) {
                    path.push(child);
                    on_stack.insert(child);
                    stack.push((self.successors(child), 0));
                }
            }
        }

        cycles
    }
}

/// Rotate a cycle so its smallest id comes first
fn canonical_rotation(cycle: &[String]) -> Vec<String> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[start..].iter().chain(&cycle[..start]).cloned().collect()
}

/// Breadth-first levels from `start`, used for impact reporting
pub(crate) fn bfs_levels<'a, F>(start: &'a str, max_depth: Option<usize>, mut neighbors: F) -> BTreeSet<String>
where
    F: FnMut(&str) -> Vec<&'a str>,
{
    let mut reached = BTreeSet::new();
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start, 0)]);

    while let Some((node, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|limit| depth >= limit) {
            continue;
        }
        for next in neighbors(node) {
            if visited.insert(next) {
                reached.insert(next.to_string());
                queue.push_back((next, depth + 1));
            }
        }
    }

    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphEdge;

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (source, target) in edges {
            graph.add_edge(GraphEdge {
                source: source.to_string(),
                target: target.to_string(),
                reference_type: "usage".to_string(),
                property: "uses".to_string(),
            });
        }
        graph
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reachability_excludes_start_even_in_cycle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(g.descendants("a"), set(&["b", "c"]));
        assert_eq!(g.ancestors("a"), set(&["b", "c"]));
    }

    #[test]
    fn test_bounded_levels() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d")]);
        assert_eq!(g.reachable_within("a", EdgeDirection::Outgoing, 0), set(&[]));
        assert_eq!(g.reachable_within("a", EdgeDirection::Outgoing, 2), set(&["b", "c"]));
        assert_eq!(g.reachable_within("d", EdgeDirection::Incoming, 1), set(&["c"]));
    }

    #[test]
    fn test_simple_paths_prune_and_limit() {
        let g = graph(&[("a", "b"), ("b", "d"), ("a", "c"), ("c", "d"), ("a", "x"), ("x", "y")]);
        let paths = g.simple_paths("a", "d", 10);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], vec!["a", "b", "d"]);
        assert_eq!(paths[1], vec!["a", "c", "d"]);

        assert_eq!(g.simple_paths("a", "d", 1).len(), 1);
        assert!(g.simple_paths("d", "a", 10).is_empty());
        assert!(g.simple_paths("a", "a", 10).is_empty());
    }

    #[test]
    fn test_simple_paths_through_cycle_stay_simple() {
        let g = graph(&[("a", "b"), ("b", "a"), ("b", "c")]);
        assert_eq!(g.simple_paths("a", "c", 10), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_cycles_and_self_loops() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("s", "s")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0], vec!["a", "b", "c"]);
        assert_eq!(cycles[1], vec!["s"]);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let g = graph(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert!(g.find_cycles().is_empty());
    }

    #[test]
    fn test_canonical_rotation() {
        let cycle = vec!["c".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(canonical_rotation(&cycle), vec!["a", "b", "c"]);
    }
}
