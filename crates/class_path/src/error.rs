use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassPathError {
    #[error("Class not found: {0}")]
    ClassNotFound(String),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
