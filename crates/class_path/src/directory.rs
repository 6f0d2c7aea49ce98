use std::{
    fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use crate::{class_file_path, ClassPathError, ClassProvider, Result};

/// A directory laid out by package, `<root>/java/lang/Object.class`.
#[derive(Debug, Clone)]
pub struct Directory {
    root: PathBuf,
}
impl Directory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
impl ClassProvider for Directory {
    fn resolve(&self, binary_name: &str) -> Result<Vec<u8>> {
        let relative = PathBuf::from(class_file_path(binary_name));
        // Names like `../x` or `/etc/x` must not escape the root.
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ClassPathError::ClassNotFound(binary_name.to_owned()));
        }

        match fs::read(self.root.join(relative)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ClassPathError::ClassNotFound(binary_name.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
