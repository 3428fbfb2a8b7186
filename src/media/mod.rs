//! Uploaded media on the local filesystem.
//!
//! Each [`MediaKind`] owns one directory under the media root. Files are
//! written under generated names, so a stored name never comes from the
//! client.

use crate::catalog_store::{DEFAULT_AUDIO_FILE, DEFAULT_IMAGE};
use anyhow::{Context, Result};
use axum::body::Bytes;
use rand::Rng;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "wma", "ogg"];
const SNIFF_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Avatar,
    ArtistImage,
    AlbumCover,
    Audio,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Avatar,
        MediaKind::ArtistImage,
        MediaKind::AlbumCover,
        MediaKind::Audio,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Avatar => "avatars",
            MediaKind::ArtistImage => "artists",
            MediaKind::AlbumCover => "album",
            MediaKind::Audio => "audios",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            MediaKind::Avatar => "avatar-",
            MediaKind::ArtistImage => "artist-",
            MediaKind::AlbumCover => "album-",
            MediaKind::Audio => "audio-",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Audio => AUDIO_EXTENSIONS,
            _ => IMAGE_EXTENSIONS,
        }
    }

    /// Placeholder assigned to new entities. It is shared, so it is never removed.
    pub fn default_file(self) -> Option<&'static str> {
        match self {
            MediaKind::Avatar => None,
            MediaKind::ArtistImage | MediaKind::AlbumCover => Some(DEFAULT_IMAGE),
            MediaKind::Audio => Some(DEFAULT_AUDIO_FILE),
        }
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("The file extension '{0}' is not allowed")]
    UnsupportedExtension(String),

    #[error("Invalid file name '{0}'")]
    InvalidName(String),

    #[error("The file {0} does not exist")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A file received from a multipart form.
#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

pub struct MediaFile {
    pub file: File,
    pub content_type: String,
    pub len: u64,
}

pub struct MediaManager {
    root: PathBuf,
}

impl MediaManager {
    /// Creates the per-kind directories if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for kind in MediaKind::ALL {
            let dir = root.join(kind.dir_name());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create media directory {:?}", dir))?;
        }
        info!("Serving media from {:?}", root);
        Ok(MediaManager { root })
    }

    pub fn dir(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Returns the lowercased extension of `file_name` if `kind` accepts it.
    pub fn check_extension(kind: MediaKind, file_name: &str) -> Result<String, MediaError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if kind.allowed_extensions().contains(&extension.as_str()) {
            Ok(extension)
        } else {
            Err(MediaError::UnsupportedExtension(extension))
        }
    }

    fn generate_name(kind: MediaKind, extension: &str) -> String {
        format!(
            "{}{}-{}.{}",
            kind.prefix(),
            chrono::Utc::now().timestamp_millis(),
            rand::rng().random_range(0..1_000_000_000u32),
            extension
        )
    }

    /// Writes the upload under a fresh name and returns that name.
    /// The file only appears once it is completely written.
    pub async fn store(&self, kind: MediaKind, upload: &Upload) -> Result<String, MediaError> {
        let extension = Self::check_extension(kind, &upload.file_name)?;
        let name = Self::generate_name(kind, &extension);
        let dir = self.dir(kind);
        let target = dir.join(&name);
        let data = upload.data.clone();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&data)?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        debug!("Stored {} ({} bytes)", name, upload.data.len());
        Ok(name)
    }

    /// Stores `upload`, hands its name to `persist`, then drops `current`.
    ///
    /// If `persist` fails the new file is removed again. Removing `current`
    /// is best effort.
    pub async fn replace<E, F>(
        &self,
        kind: MediaKind,
        upload: &Upload,
        current: Option<&str>,
        persist: F,
    ) -> Result<String, E>
    where
        E: From<MediaError>,
        F: FnOnce(&str) -> Result<(), E>,
    {
        let name = self.store(kind, upload).await?;
        if let Err(err) = persist(&name) {
            self.remove(kind, &name).await;
            return Err(err);
        }
        if let Some(current) = current {
            self.remove(kind, current).await;
        }
        Ok(name)
    }

    /// Maps a client supplied file name to a path inside the kind directory.
    pub fn resolve(&self, kind: MediaKind, file_name: &str) -> Result<PathBuf, MediaError> {
        let invalid = || MediaError::InvalidName(file_name.to_string());

        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(invalid()),
        }
        if file_name.contains(['/', '\\']) || file_name.contains("..") {
            return Err(invalid());
        }

        let dir = self.dir(kind);
        let path = dir.join(file_name);
        let canonical = match path.canonicalize() {
            Ok(p) => p,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(MediaError::NotFound(file_name.to_string()))
            }
            Err(err) => return Err(err.into()),
        };
        if !canonical.starts_with(dir.canonicalize()?) || !canonical.is_file() {
            return Err(MediaError::NotFound(file_name.to_string()));
        }
        Ok(canonical)
    }

    /// Opens a stored file for streaming, sniffing its content type.
    pub async fn open(&self, kind: MediaKind, file_name: &str) -> Result<MediaFile, MediaError> {
        let path = self.resolve(kind, file_name)?;
        let mut file = File::open(&path).await?;
        let len = file.metadata().await?.len();

        let mut head = vec![0u8; SNIFF_LEN];
        let read = file.read(&mut head).await?;
        file.rewind().await?;

        let content_type = infer::get(&head[..read])
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(MediaFile {
            file,
            content_type,
            len,
        })
    }

    /// Deletes a stored file. Missing files and the shared default are skipped,
    /// other failures are only logged.
    pub async fn remove(&self, kind: MediaKind, file_name: &str) {
        if file_name.is_empty() || kind.default_file() == Some(file_name) {
            return;
        }
        let path = match self.resolve(kind, file_name) {
            Ok(path) => path,
            Err(MediaError::NotFound(_)) => return,
            Err(err) => {
                warn!("Not removing {}: {}", file_name, err);
                return;
            }
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed {:?}", path),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!("Failed to remove {:?}: {}", path, err),
        }
    }
}
