// Lookup of class file bytes by binary class name (`java/lang/Object`).

mod class_path;
mod directory;
mod error;
mod jar;
mod memory;

pub use class_path::ClassPath;
pub use directory::Directory;
pub use error::ClassPathError;
pub use jar::Jar;
pub use memory::InMemory;

pub type Result<T, E = ClassPathError> = std::result::Result<T, E>;

/// Something that can turn a binary class name into class file bytes.
///
/// `ClassPathError::ClassNotFound` is the regular "not here" answer; other
/// errors mean the provider itself had trouble.
pub trait ClassProvider {
    fn resolve(&self, binary_name: &str) -> Result<Vec<u8>>;
}

impl<P: ClassProvider + ?Sized> ClassProvider for &P {
    fn resolve(&self, binary_name: &str) -> Result<Vec<u8>> {
        (**self).resolve(binary_name)
    }
}

impl<P: ClassProvider + ?Sized> ClassProvider for Box<P> {
    fn resolve(&self, binary_name: &str) -> Result<Vec<u8>> {
        (**self).resolve(binary_name)
    }
}

pub(crate) fn class_file_path(binary_name: &str) -> String {
    format!("{}.class", binary_name)
}
