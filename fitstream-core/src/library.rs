//! Media library: maps logical media identifiers to files on disk.
//!
//! Scans a media directory for workout videos, derives titles from file
//! names, and assigns each file a stable [`MediaId`]. The HTTP layer
//! resolves an id to an absolute path here before handing the path to the
//! streamer; access control happens upstream of both.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::LibraryConfig;
use crate::streaming::mime_for_path;

/// Stable identifier for one media file, derived from its path.
///
/// Rendered as 16 lowercase hex digits; rescanning the same tree yields the
/// same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(u64);

impl MediaId {
    /// Derives the id for a media file path.
    pub fn for_path(path: &Path) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Parses the 16-hex-digit wire form.
    ///
    /// # Errors
    ///
    /// - `LibraryError::InvalidMediaId` - wrong length or non-hex characters
    pub fn from_hex(value: &str) -> Result<Self, LibraryError> {
        if value.len() != 16 {
            return Err(LibraryError::InvalidMediaId {
                value: value.to_string(),
            });
        }
        u64::from_str_radix(value, 16)
            .map(Self)
            .map_err(|_| LibraryError::InvalidMediaId {
                value: value.to_string(),
            })
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for MediaId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One video file known to the library.
#[derive(Debug, Clone, Serialize)]
pub struct MediaFile {
    pub id: MediaId,
    /// Title derived from the file name.
    pub title: String,
    /// Absolute path to the video file.
    #[serde(skip)]
    pub file_path: PathBuf,
    /// File size in bytes at scan time.
    pub size: u64,
    /// Content type the file will be served with.
    pub mime_type: String,
}

/// Library errors.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("invalid media id: {value}")]
    InvalidMediaId { value: String },

    #[error("media not found: {id}")]
    MediaNotFound { id: MediaId },

    #[error("failed to scan {path}: {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// In-memory index over the scanned media directory.
#[derive(Debug)]
pub struct MediaLibrary {
    media: HashMap<MediaId, MediaFile>,
    video_extensions: Vec<String>,
}

impl Default for MediaLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaLibrary {
    /// Creates an empty library with the default extension set.
    pub fn new() -> Self {
        Self::from_config(&LibraryConfig::default())
    }

    /// Creates an empty library recognizing the configured extensions.
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self {
            media: HashMap::new(),
            video_extensions: config
                .video_extensions
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Scans a directory tree for video files and indexes them.
    ///
    /// Returns the number of files added. Subdirectories that fail to read
    /// are skipped with a warning rather than aborting the scan.
    ///
    /// # Errors
    ///
    /// - `LibraryError::ScanFailed` - the root directory itself is unreadable
    pub async fn scan_directory(&mut self, dir: &Path) -> Result<usize, LibraryError> {
        let count = self
            .scan_recursive(dir)
            .await
            .map_err(|source| LibraryError::ScanFailed {
                path: dir.to_path_buf(),
                source,
            })?;
        debug!(dir = %dir.display(), count, "library scan complete");
        Ok(count)
    }

    fn scan_recursive<'a>(
        &'a mut self,
        dir: &'a Path,
    ) -> std::pin::Pin<Box<dyn Future<Output = Result<usize, std::io::Error>> + Send + 'a>> {
        Box::pin(async move {
            let mut count = 0;
            let mut entries = tokio::fs::read_dir(dir).await?;

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();

                if path.is_dir() {
                    match self.scan_recursive(&path).await {
                        Ok(subcount) => count += subcount,
                        Err(e) => {
                            warn!(path = %path.display(), "skipping unreadable directory: {e}");
                        }
                    }
                } else if path.is_file()
                    && self.is_video(&path)
                    && let Ok(metadata) = entry.metadata().await
                {
                    let file = Self::media_from_file(path, metadata.len());
                    self.media.insert(file.id, file);
                    count += 1;
                }
            }

            Ok(count)
        })
    }

    fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .is_some_and(|ext| self.video_extensions.iter().any(|known| *known == ext))
    }

    fn media_from_file(path: PathBuf, size: u64) -> MediaFile {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled Workout")
            .replace(['.', '_'], " ");

        MediaFile {
            id: MediaId::for_path(&path),
            title,
            mime_type: mime_for_path(&path),
            file_path: path,
            size,
        }
    }

    /// Looks up one media file by id.
    pub fn media_by_id(&self, id: MediaId) -> Option<&MediaFile> {
        self.media.get(&id)
    }

    /// Resolves an id to the absolute file path, confirming the record
    /// exists.
    ///
    /// # Errors
    ///
    /// - `LibraryError::MediaNotFound` - id is not in the index
    pub fn resolve_path(&self, id: MediaId) -> Result<&Path, LibraryError> {
        self.media
            .get(&id)
            .map(|file| file.file_path.as_path())
            .ok_or(LibraryError::MediaNotFound { id })
    }

    /// Locates a sibling thumbnail image for a media file, if one exists.
    ///
    /// Looks for `<stem>.jpg` then `<stem>.png` next to the video.
    pub fn thumbnail_path(&self, id: MediaId) -> Option<PathBuf> {
        let file = self.media.get(&id)?;
        for ext in ["jpg", "png"] {
            let candidate = file.file_path.with_extension(ext);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// All indexed media, unordered.
    pub fn all_media(&self) -> Vec<&MediaFile> {
        self.media.values().collect()
    }

    /// Number of indexed media files.
    pub fn len(&self) -> usize {
        self.media.len()
    }

    /// True when nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn populated_library() -> (TempDir, MediaLibrary) {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("squats.mp4"), b"video a")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"not video")
            .await
            .unwrap();
        let nested = dir.path().join("mobility");
        tokio::fs::create_dir(&nested).await.unwrap();
        tokio::fs::write(nested.join("hip_opener.webm"), b"video b")
            .await
            .unwrap();

        let mut library = MediaLibrary::new();
        library.scan_directory(dir.path()).await.unwrap();
        (dir, library)
    }

    #[tokio::test]
    async fn scan_finds_nested_videos_and_skips_other_files() {
        let (_dir, library) = populated_library().await;
        assert_eq!(library.len(), 2);

        let titles: Vec<_> = library
            .all_media()
            .iter()
            .map(|m| m.title.clone())
            .collect();
        assert!(titles.contains(&"squats".to_string()));
        assert!(titles.contains(&"hip opener".to_string()));
    }

    #[tokio::test]
    async fn rescan_yields_stable_ids() {
        let (dir, library) = populated_library().await;
        let mut ids: Vec<_> = library.all_media().iter().map(|m| m.id).collect();
        ids.sort();

        let mut fresh = MediaLibrary::new();
        fresh.scan_directory(dir.path()).await.unwrap();
        let mut fresh_ids: Vec<_> = fresh.all_media().iter().map(|m| m.id).collect();
        fresh_ids.sort();

        assert_eq!(ids, fresh_ids);
    }

    #[tokio::test]
    async fn resolve_path_round_trips_through_hex_id() {
        let (_dir, library) = populated_library().await;
        let media = library.all_media()[0].clone();

        let parsed = MediaId::from_hex(&media.id.to_string()).unwrap();
        assert_eq!(parsed, media.id);
        assert_eq!(library.resolve_path(parsed).unwrap(), media.file_path);
    }

    #[tokio::test]
    async fn unknown_id_is_media_not_found() {
        let library = MediaLibrary::new();
        let err = library.resolve_path(MediaId(42)).unwrap_err();
        assert!(matches!(err, LibraryError::MediaNotFound { .. }));
    }

    #[test]
    fn malformed_hex_ids_are_rejected() {
        for value in ["", "abc", "zzzzzzzzzzzzzzzz", "0123456789abcdef0"] {
            assert!(MediaId::from_hex(value).is_err(), "{value:?}");
        }
    }

    #[tokio::test]
    async fn thumbnail_is_found_next_to_the_video() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("plank.mp4"), b"video")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("plank.jpg"), b"image")
            .await
            .unwrap();

        let mut library = MediaLibrary::new();
        library.scan_directory(dir.path()).await.unwrap();
        let id = library.all_media()[0].id;

        let thumb = library.thumbnail_path(id).unwrap();
        assert_eq!(thumb.file_name().unwrap(), "plank.jpg");
    }

    #[tokio::test]
    async fn missing_thumbnail_is_none() {
        let (_dir, library) = populated_library().await;
        let id = library.all_media()[0].id;
        // Fixtures have no sibling images.
        assert!(library.thumbnail_path(id).is_none());
    }
}
