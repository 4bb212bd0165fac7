//! Filesystem photo store rooted at a single upload directory.
//!
//! Files are written through a `cap_std` directory handle, so neither stored
//! names nor requested names can escape the upload directory. Stored names
//! have the form `<uuid>.<ext>`; anything else is treated as absent.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{PhotoSource, PhotoUploadError, PhotoUploader};
use crate::domain::{PhotoUpload, StoredPhoto};

/// Public path under which stored photos are served.
pub const UPLOADS_ROUTE_PREFIX: &str = "/uploads";

const MAX_EXTENSION_LEN: usize = 8;

/// Photo store writing into one directory on the local filesystem.
#[derive(Clone)]
pub struct LocalPhotoStore {
    dir: Arc<Dir>,
}

impl LocalPhotoStore {
    /// Open (creating if needed) the upload directory at `path`.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, PhotoUploadError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| PhotoUploadError::storage(err.to_string()))?
            .map_err(|err| PhotoUploadError::storage(err.to_string()))
    }
}

/// Whether `name` looks like a file this store generated.
pub(crate) fn is_stored_name(name: &str) -> bool {
    let Some((stem, ext)) = name.split_once('.') else {
        return false;
    };
    Uuid::try_parse(stem).is_ok()
        && (1..=MAX_EXTENSION_LEN).contains(&ext.len())
        && ext
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl PhotoUploader for LocalPhotoStore {
    async fn upload(&self, photo: &PhotoUpload, base_url: &str) -> Result<String, PhotoUploadError> {
        if !photo.is_image() {
            return Err(PhotoUploadError::rejected(format!(
                "content type {} is not an image",
                photo.content_type.as_deref().unwrap_or("(missing)")
            )));
        }
        if photo.bytes.is_empty() {
            return Err(PhotoUploadError::rejected("photo is empty"));
        }

        let name = format!("{}.{}", Uuid::new_v4().simple(), photo.extension());
        let bytes = photo.bytes.clone();
        let target = name.clone();
        self.blocking(move |dir| dir.write(&target, bytes)).await?;
        Ok(format!(
            "{}{UPLOADS_ROUTE_PREFIX}/{name}",
            base_url.trim_end_matches('/')
        ))
    }

    async fn remove(&self, url: &str) -> Result<(), PhotoUploadError> {
        let name = url.rsplit('/').next().unwrap_or_default().to_owned();
        if !is_stored_name(&name) {
            return Err(PhotoUploadError::rejected(format!(
                "{url} does not name a stored photo"
            )));
        }
        self.blocking(move |dir| match dir.remove_file(&name) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .await
    }
}

#[async_trait]
impl PhotoSource for LocalPhotoStore {
    async fn fetch(&self, file_name: &str) -> Result<Option<StoredPhoto>, PhotoUploadError> {
        if !is_stored_name(file_name) {
            return Ok(None);
        }
        let name = file_name.to_owned();
        let content_type = content_type_for(&name).to_owned();
        let bytes = self
            .blocking(move |dir| match dir.read(&name) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err),
            })
            .await?;
        Ok(bytes.map(|bytes| StoredPhoto {
            content_type,
            bytes,
        }))
    }
}
