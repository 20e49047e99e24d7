use thiserror::Error;

/// Errors that can occur while packaging an archive.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The zip writer rejected an entry or failed to finalize the container.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry bytes into the in-memory buffer failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
