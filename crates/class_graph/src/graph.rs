use std::{collections::HashMap, fmt};

use javelin_class_file::ClassFile;

use crate::NodeError;

#[derive(Debug)]
pub enum NodeStatus {
    Resolved(ClassFile),
    Failed(NodeError),
}

/// A class reached during collection.
#[derive(Debug)]
pub struct Node {
    name: String,
    status: NodeStatus,
    edges: Vec<String>,
}
impl Node {
    pub(crate) fn resolved(name: String, class_file: ClassFile, edges: Vec<String>) -> Self {
        Self {
            name,
            status: NodeStatus::Resolved(class_file),
            edges,
        }
    }

    pub(crate) fn failed(name: String, error: NodeError) -> Self {
        Self {
            name,
            status: NodeStatus::Failed(error),
            edges: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> &NodeStatus {
        &self.status
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, NodeStatus::Resolved(_))
    }

    pub fn class_file(&self) -> Option<&ClassFile> {
        match &self.status {
            NodeStatus::Resolved(class_file) => Some(class_file),
            NodeStatus::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&NodeError> {
        match &self.status {
            NodeStatus::Resolved(_) => None,
            NodeStatus::Failed(error) => Some(error),
        }
    }

    /// Classes this one refers to, in discovery order. Empty for failed nodes.
    pub fn edges(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().map(String::as_str)
    }
}

/// The classes reachable from a root class. Nodes are kept in the order they
/// were visited, starting with the root.
#[derive(Debug)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}
impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, node: Node) {
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    pub fn root(&self) -> &Node {
        // A graph is only handed out once its root has been resolved.
        &self.nodes[0]
    }

    pub fn nodes(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Outgoing edges of `name`; empty if the class is not in the graph.
    pub fn edges<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.node(name).into_iter().flat_map(Node::edges)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    pub fn resolved(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_resolved())
    }

    pub fn failed(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.is_resolved())
    }
}
impl<'a> IntoIterator for &'a DependencyGraph {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node.error() {
                None => writeln!(f, "{}", node.name)?,
                Some(error) => writeln!(f, "{} (failed: {})", node.name, error)?,
            }
            for edge in node.edges() {
                writeln!(f, "    -> {}", edge)?;
            }
        }
        Ok(())
    }
}
