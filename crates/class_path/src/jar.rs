use std::{
    fmt,
    fs::File,
    io::{Cursor, Read},
    path::{Path, PathBuf},
    sync::Mutex,
};

use memmap::Mmap;
use zip::{result::ZipError, ZipArchive};

use crate::{class_file_path, ClassPathError, ClassProvider, Result};

// Upper bound on the buffer reserved up front from an entry's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// A memory-mapped jar (or any zip) archive with class files stored by path.
pub struct Jar {
    path: PathBuf,
    // Reading an entry needs `&mut ZipArchive`.
    archive: Mutex<ZipArchive<Cursor<Mmap>>>,
}
impl Jar {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        // SAFETY: the mapping is read-only; the archive must not be truncated while open.
        let mmap = unsafe { Mmap::map(&file)? };
        let archive = ZipArchive::new(Cursor::new(mmap))?;

        Ok(Self {
            path,
            archive: Mutex::new(archive),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
impl ClassProvider for Jar {
    fn resolve(&self, binary_name: &str) -> Result<Vec<u8>> {
        let mut archive = self
            .archive
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut entry = match archive.by_name(&class_file_path(binary_name)) {
            Ok(entry) if entry.is_file() => entry,
            Ok(_) | Err(ZipError::FileNotFound) => {
                return Err(ClassPathError::ClassNotFound(binary_name.to_owned()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
impl fmt::Debug for Jar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jar").field("path", &self.path).finish()
    }
}
