use std::{env, ffi::OsStr, path::Path};

use crate::{ClassPathError, ClassProvider, Directory, Jar, Result};

/// An ordered list of providers. The first one that has a class wins.
#[derive(Default)]
pub struct ClassPath {
    providers: Vec<Box<dyn ClassProvider + Send + Sync>>,
}
impl ClassPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl ClassProvider + Send + Sync + 'static) -> Self {
        self.push(provider);
        self
    }

    pub fn push(&mut self, provider: impl ClassProvider + Send + Sync + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Builds a class path from a platform path list such as the value of
    /// `CLASSPATH`. Entries ending in `.jar` or `.zip` are opened as
    /// archives, everything else is treated as a directory.
    pub fn from_path_list(path_list: impl AsRef<OsStr>) -> Result<Self> {
        let mut class_path = ClassPath::new();
        for entry in env::split_paths(&path_list) {
            if entry.as_os_str().is_empty() {
                continue;
            }

            if is_archive(&entry) {
                class_path.push(Jar::open(entry)?);
            } else {
                class_path.push(Directory::new(entry));
            }
        }
        Ok(class_path)
    }
}
impl ClassProvider for ClassPath {
    fn resolve(&self, binary_name: &str) -> Result<Vec<u8>> {
        for provider in &self.providers {
            match provider.resolve(binary_name) {
                Ok(bytes) => return Ok(bytes),
                Err(ClassPathError::ClassNotFound(_)) => continue,
                Err(e) => log::warn!("Failed to look up {}: {}", binary_name, e),
            }
        }

        Err(ClassPathError::ClassNotFound(binary_name.to_owned()))
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip")
        })
}
