//! Filesystem-backed cover image store
//!
//! Covers are stored on disk under the configured directory; the database
//! only keeps the filename. Filenames embed the ISBN plus a random suffix so
//! a replaced cover gets a new URL and stale caches miss.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::{
    config::CoversConfig,
    error::{AppError, AppResult},
};

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

pub struct CoverStore {
    dir: PathBuf,
    /// Public base URL, ends with a slash.
    public_url: String,
}

impl CoverStore {
    pub async fn new(config: &CoversConfig) -> AppResult<Self> {
        let dir = PathBuf::from(&config.dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("creating cover dir: {e}")))?;
        Ok(Self {
            dir,
            public_url: config.public_url.clone(),
        })
    }

    /// Stores a cover image, returning the generated filename to persist on
    /// the book row. Only JPEG and PNG bodies are accepted.
    pub async fn store(&self, isbn: &str, data: &[u8]) -> AppResult<String> {
        let ext = detect_extension(data)
            .ok_or_else(|| AppError::validation("unsupported image type, expected jpeg or png"))?;

        let suffix: u32 = rand::thread_rng().gen();
        let file_name = format!("{isbn}_{suffix:08x}{ext}");

        tokio::fs::write(self.path_for(&file_name), data)
            .await
            .map_err(|e| AppError::Internal(format!("writing cover file: {e}")))?;
        Ok(file_name)
    }

    /// Removes a stored cover file. A file already gone on disk is fine.
    pub async fn remove(&self, file_name: &str) -> AppResult<()> {
        check_file_name(file_name)?;
        match tokio::fs::remove_file(self.path_for(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("removing cover file: {e}"))),
        }
    }

    /// Resolves a stored filename to the public URL clients fetch it from.
    pub fn resolve(&self, cover_file: Option<&str>) -> Option<String> {
        let file = cover_file?;
        if file.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.public_url, file))
    }

    /// Reads a cover file for serving, returning the bytes and content type.
    pub async fn read(&self, file_name: &str) -> AppResult<(Vec<u8>, &'static str)> {
        check_file_name(file_name)?;
        let content_type = content_type_for(file_name)
            .ok_or_else(|| AppError::validation("unknown file extension"))?;
        match tokio::fs::read(self.path_for(file_name)).await {
            Ok(bytes) => Ok((bytes, content_type)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found("cover"))
            }
            Err(e) => Err(AppError::Internal(format!("reading cover file: {e}"))),
        }
    }

    fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

/// Rejects names that could escape the cover directory.
fn check_file_name(file_name: &str) -> AppResult<()> {
    let valid = !file_name.is_empty()
        && !file_name.starts_with('.')
        && file_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !file_name.contains("..");
    if !valid {
        return Err(AppError::validation("invalid cover file name"));
    }
    Ok(())
}

fn detect_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(JPEG_MAGIC) {
        Some(".jpeg")
    } else if data.starts_with(PNG_MAGIC) {
        Some(".png")
    } else {
        None
    }
}

fn content_type_for(file_name: &str) -> Option<&'static str> {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some("jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        _ => None,
    }
}
