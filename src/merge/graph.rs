//! Merge-group clustering over suggestion names.
//!
//! Merge relationships are treated as undirected: an edge declared by only
//! one side still joins both endpoints. Groups are the connected components
//! of the resulting graph, so they always partition the node set.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::suggestion::Suggestion;

/// Stable digest of a group's member set.
///
/// Independent of member order, so a group keeps its key across
/// recomputations as long as its membership does not change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Returns the key as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of suggestion names that collapse into one output record.
///
/// Members are listed in the order they were first inserted into the graph.
/// A group may name suggestions that do not exist (dangling merge targets);
/// the resolver drops those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeGroup {
    members: Vec<String>,
}

impl MergeGroup {
    /// Creates a group from member names.
    #[must_use]
    pub fn new(members: Vec<String>) -> Self {
        Self { members }
    }

    /// Member names.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of member names, dangling ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if `name` is a member.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }

    /// Returns true if the group has exactly one member.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// Iterates over member names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Stable key for this member set.
    #[must_use]
    pub fn key(&self) -> GroupKey {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_unstable();

        let mut h = Hasher::new();
        for name in sorted {
            h.update(name.as_bytes());
            // Separator keeps ["ab", "c"] and ["a", "bc"] apart.
            h.update(&[0]);
        }
        GroupKey(h.finalize().to_hex().to_string())
    }
}

/// Undirected graph over suggestion names.
///
/// # Examples
///
/// ```
/// use scribe::NameGraph;
///
/// let mut graph = NameGraph::new();
/// graph.add_edge("A", "B");
/// graph.add_edge("B", "C");
/// graph.add_node("D");
///
/// let groups = graph.groups();
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].members(), ["A", "B", "C"]);
/// assert_eq!(groups[1].members(), ["D"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NameGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    edges: HashSet<(usize, usize)>,
}

impl NameGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from each suggestion's name and merge targets.
    #[must_use]
    pub fn from_suggestions(suggestions: &[Suggestion]) -> Self {
        let mut graph = Self::new();
        for suggestion in suggestions {
            graph.add_node(&suggestion.name);
            for target in &suggestion.merge_targets {
                graph.add_edge(&suggestion.name, target);
            }
        }
        graph
    }

    /// Ensures a node for `name` exists and returns its index.
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Connects `a` and `b` in both directions.
    ///
    /// Both nodes are created if missing. A self-reference only ensures the
    /// node; no self-loop is recorded. Repeated edges are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let ia = self.add_node(a);
        let ib = self.add_node(b);
        if ia == ib {
            return;
        }
        let key = (ia.min(ib), ia.max(ib));
        if !self.edges.insert(key) {
            return;
        }
        self.adjacency[ia].push(ib);
        self.adjacency[ib].push(ia);
    }

    /// Number of distinct names in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if `name` is a node.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Direct neighbours of `name`, in edge insertion order.
    ///
    /// Returns `None` if `name` is not a node.
    #[must_use]
    pub fn neighbors(&self, name: &str) -> Option<Vec<&str>> {
        let &idx = self.index.get(name)?;
        Some(
            self.adjacency[idx]
                .iter()
                .map(|&n| self.names[n].as_str())
                .collect(),
        )
    }

    /// Connected components, as merge groups.
    ///
    /// Components are emitted in the order of their earliest-inserted node;
    /// members within a component follow node insertion order. Traversal
    /// uses an explicit queue, so deep chains cannot exhaust the stack.
    #[must_use]
    pub fn groups(&self) -> Vec<MergeGroup> {
        let mut visited = vec![false; self.names.len()];
        let mut groups = Vec::new();
        let mut queue = VecDeque::new();

        for start in 0..self.names.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            queue.push_back(start);

            let mut component = Vec::new();
            while let Some(node) = queue.pop_front() {
                component.push(node);
                for &next in &self.adjacency[node] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            component.sort_unstable();
            groups.push(MergeGroup::new(
                component.into_iter().map(|i| self.names[i].clone()).collect(),
            ));
        }

        debug!(
            nodes = self.names.len(),
            edges = self.edges.len(),
            groups = groups.len(),
            "clustered suggestion names"
        );
        groups
    }
}

/// Partitions suggestion names into merge groups.
#[must_use]
pub fn cluster(suggestions: &[Suggestion]) -> Vec<MergeGroup> {
    NameGraph::from_suggestions(suggestions).groups()
}
