//! Circular reference detection over the identifier graph.

use std::fmt;

use super::graph::DependencyGraph;
use super::identifier::Identifier;

/// One circular reference found by [`find_cycles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Identifiers on the cycle, starting at `start` and following references.
    pub path: Vec<Identifier>,
    /// The identifier where the back edge closes the cycle.
    pub start: Identifier,
}

impl Cycle {
    /// Returns true if `other` lists the same identifiers in the same cyclic order.
    pub fn is_rotation_of(&self, other: &[Identifier]) -> bool {
        let n = self.path.len();
        if n != other.len() {
            return false;
        }
        if n == 0 {
            return true;
        }
        (0..n).any(|shift| (0..n).all(|i| self.path[(i + shift) % n] == other[i]))
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for identifier in &self.path {
            write!(f, "{} -> ", identifier)?;
        }
        write!(f, "{}", self.start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

/// Finds every back-edge cycle in the graph.
///
/// Classic three-color depth-first search driven from every identifier in
/// registry order. Reaching an identifier that is on the current path emits
/// the path suffix starting at it; reaching a finished identifier is skipped.
/// References to undefined identifiers are not edges. The walk keeps its own
/// frame stack, so long reference chains cannot overflow the call stack.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let nodes: Vec<&Identifier> = graph.identifiers().collect();

    let adjacency: Vec<Vec<usize>> = nodes
        .iter()
        .map(|node| {
            graph
                .dependencies(node)
                .map(|targets| targets.iter().filter_map(|t| graph.index_of(t)).collect())
                .unwrap_or_default()
        })
        .collect();

    let mut state = vec![VisitState::Unvisited; nodes.len()];
    let mut cycles = Vec::new();
    // (node, index of the next edge to follow)
    let mut frames: Vec<(usize, usize)> = Vec::new();
    let mut path: Vec<usize> = Vec::new();

    for root in 0..nodes.len() {
        if state[root] != VisitState::Unvisited {
            continue;
        }
        state[root] = VisitState::OnStack;
        frames.push((root, 0));
        path.push(root);

        while let Some(frame) = frames.last_mut() {
            let (node, edge) = *frame;
            let Some(&next) = adjacency[node].get(edge) else {
                state[node] = VisitState::Done;
                frames.pop();
                path.pop();
                continue;
            };
            frame.1 += 1;

            match state[next] {
                VisitState::Unvisited => {
                    state[next] = VisitState::OnStack;
                    frames.push((next, 0));
                    path.push(next);
                }
                VisitState::OnStack => {
                    if let Some(k) = path.iter().position(|&n| n == next) {
                        cycles.push(Cycle {
                            path: path[k..].iter().map(|&n| nodes[n].clone()).collect(),
                            start: nodes[next].clone(),
                        });
                    }
                }
                VisitState::Done => {}
            }
        }
    }

    cycles
}
