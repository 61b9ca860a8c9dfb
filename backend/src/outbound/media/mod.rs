//! Filesystem-backed recipe image store.
//!
//! Every path is resolved against a capability handle on the media root, so
//! a stored path can never reach outside it. Writes land in a staging file
//! first and are renamed into place.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ImagePath;
use crate::domain::ports::{ImageStoreError, RecipeImageStore};

/// Image blobs stored beneath a media root directory.
#[derive(Clone)]
pub struct FsRecipeImageStore {
    root: Arc<Dir>,
    root_path: PathBuf,
}

impl FsRecipeImageStore {
    /// Open (creating if needed) the media root.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root_path = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())?;
        let root = Dir::open_ambient_dir(&root_path, ambient_authority())?;
        Ok(Self {
            root: Arc::new(root),
            root_path,
        })
    }

    /// Directory that stored paths are relative to.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    async fn run_blocking<T, F>(&self, path: &ImagePath, op: F) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Path) -> io::Result<T> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        let relative = PathBuf::from(path.as_str());
        let path_display = path.as_str().to_owned();
        tokio::task::spawn_blocking(move || op(&root, &relative))
            .await
            .map_err(|err| ImageStoreError::unavailable(err.to_string()))?
            .map_err(|err| {
                debug!(path = %path_display, error = %err, "image store operation failed");
                ImageStoreError::io(path_display, err.to_string())
            })
    }
}

fn write_staged(root: &Dir, relative: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = relative.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "image path has no file name")
    })?;
    let parent = relative.parent().unwrap_or_else(|| Path::new(""));
    if !parent.as_os_str().is_empty() {
        root.create_dir_all(parent)?;
    }

    let mut staged_name = file_name.to_os_string();
    staged_name.push(format!(".tmp-{}", Uuid::new_v4().simple()));
    let staged = parent.join(staged_name);
    root.write(&staged, bytes)?;
    match root.rename(&staged, root, relative) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _cleanup = root.remove_file(&staged);
            Err(err)
        }
    }
}

#[async_trait]
impl RecipeImageStore for FsRecipeImageStore {
    async fn store(&self, path: &ImagePath, bytes: Vec<u8>) -> Result<(), ImageStoreError> {
        self.run_blocking(path, move |root, relative| write_staged(root, relative, &bytes))
            .await
    }

    async fn remove(&self, path: &ImagePath) -> Result<(), ImageStoreError> {
        self.run_blocking(path, |root, relative| match root.remove_file(relative) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        })
        .await
    }

    async fn exists(&self, path: &ImagePath) -> Result<bool, ImageStoreError> {
        self.run_blocking(path, |root, relative| Ok(root.is_file(relative)))
            .await
    }
}
