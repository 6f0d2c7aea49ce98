use std::collections::HashMap;

use crate::{ClassPathError, ClassProvider, Result};

/// Class bytes held in memory, keyed by binary name.
#[derive(Debug, Default, Clone)]
pub struct InMemory {
    classes: HashMap<String, Vec<u8>>,
}
impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, binary_name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.classes.insert(binary_name.into(), bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
impl ClassProvider for InMemory {
    fn resolve(&self, binary_name: &str) -> Result<Vec<u8>> {
        self.classes
            .get(binary_name)
            .cloned()
            .ok_or_else(|| ClassPathError::ClassNotFound(binary_name.to_owned()))
    }
}
impl<N: Into<String>> FromIterator<(N, Vec<u8>)> for InMemory {
    fn from_iter<T: IntoIterator<Item = (N, Vec<u8>)>>(iter: T) -> Self {
        Self {
            classes: iter.into_iter().map(|(n, b)| (n.into(), b)).collect(),
        }
    }
}
