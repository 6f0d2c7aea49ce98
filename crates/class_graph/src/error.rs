use javelin_class_file::ClassFileError;
use javelin_class_path::ClassPathError;
use thiserror::Error;

/// Why a single class could not be added to the graph. Recorded on its node.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Unresolved(#[from] ClassPathError),
    #[error(transparent)]
    Malformed(#[from] ClassFileError),
    #[error("Expected class {expected}, found {found}")]
    NameMismatch { expected: String, found: String },
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Root class {name} could not be collected: {source}")]
    RootUnresolved { name: String, source: NodeError },
    #[error("Collection was cancelled")]
    Cancelled,
}
