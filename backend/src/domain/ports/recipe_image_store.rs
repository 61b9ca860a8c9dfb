//! Port for recipe image blob storage.

use async_trait::async_trait;

use crate::domain::ImagePath;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The storage root could not be opened.
        Unavailable { message: String } => "image store unavailable: {message}",
        /// Reading or writing a blob failed.
        Io { path: String, message: String } => "image store I/O failed for {path}: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeImageStore: Send + Sync {
    /// Write `bytes` at `path`, creating parent directories.
    async fn store(&self, path: &ImagePath, bytes: Vec<u8>) -> Result<(), ImageStoreError>;

    /// Remove the blob at `path`. A missing blob is not an error.
    async fn remove(&self, path: &ImagePath) -> Result<(), ImageStoreError>;

    /// Whether a blob exists at `path`.
    async fn exists(&self, path: &ImagePath) -> Result<bool, ImageStoreError>;
}
