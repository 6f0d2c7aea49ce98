use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use javelin_class_file::ClassFile;
use javelin_class_path::ClassProvider;

use crate::{
    graph::{DependencyGraph, Node},
    referenced_classes, GraphError, NodeError, Result,
};

/// Walks the classes reachable from a root class, breadth first.
///
/// A class that cannot be found or decoded becomes a failed node and the walk
/// carries on; only a failure of the root class fails the whole run.
pub struct Collector<P> {
    provider: P,
    cancelled: Option<Arc<AtomicBool>>,
}
impl<P: ClassProvider> Collector<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cancelled: None,
        }
    }

    /// Setting the flag stops a running collection at its next dequeue.
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn collect(&self, root: &str) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        // Everything ever enqueued, so each class is resolved at most once.
        let mut visited = HashSet::from([root.to_owned()]);
        let mut pending = VecDeque::from([root.to_owned()]);

        while let Some(name) = pending.pop_front() {
            if self.is_cancelled() {
                log::debug!("Cancelled with {} classes pending", pending.len() + 1);
                return Err(GraphError::Cancelled);
            }
            log::trace!("Resolving {}", name);

            let node = match self.visit(&name) {
                Ok((class_file, references)) => {
                    let edges = references
                        .into_iter()
                        .filter(|reference| *reference != name)
                        .collect::<Vec<_>>();
                    for reference in &edges {
                        if visited.insert(reference.clone()) {
                            pending.push_back(reference.clone());
                        }
                    }

                    log::debug!("Resolved {} with {} references", name, edges.len());
                    Node::resolved(name, class_file, edges)
                }
                Err(source) if graph.is_empty() => {
                    return Err(GraphError::RootUnresolved { name, source });
                }
                Err(error) => {
                    log::warn!("Failed to resolve {}: {}", name, error);
                    Node::failed(name, error)
                }
            };
            graph.insert(node);
        }

        Ok(graph)
    }

    fn visit(&self, name: &str) -> Result<(ClassFile, Vec<String>), NodeError> {
        let bytes = self.provider.resolve(name)?;
        let class_file = ClassFile::parse(&bytes)?;

        let class_name = class_file.class_name()?;
        if class_name != name {
            return Err(NodeError::NameMismatch {
                expected: name.to_owned(),
                found: class_name.to_owned(),
            });
        }

        let references = referenced_classes(&class_file)?;
        Ok((class_file, references))
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .map_or(false, |cancelled| cancelled.load(Ordering::Relaxed))
    }
}
