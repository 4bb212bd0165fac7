//! Ports for storing uploaded photos and reading them back.

use async_trait::async_trait;

use crate::domain::{PhotoUpload, StoredPhoto};

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo storage adapters.
    pub enum PhotoUploadError {
        /// The upload itself is unacceptable (wrong type, empty body).
        Rejected { message: String } => "photo rejected: {message}",
        /// The storage backend failed.
        Storage { message: String } => "photo storage failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoUploader: Send + Sync {
    /// Persist `photo` and return its public URL rooted at `base_url`.
    async fn upload(&self, photo: &PhotoUpload, base_url: &str) -> Result<String, PhotoUploadError>;

    /// Remove a previously uploaded photo by the URL `upload` returned.
    async fn remove(&self, url: &str) -> Result<(), PhotoUploadError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Look up a stored photo by file name. `Ok(None)` when it does not exist.
    async fn fetch(&self, file_name: &str) -> Result<Option<StoredPhoto>, PhotoUploadError>;
}
