//! In-memory static asset table.
//!
//! Every file under the static root is read once at startup and keyed by its path relative to
//! the root, using `/` separators. Each asset carries a content-hash ETag so clients can
//! revalidate with `If-None-Match`.

use axum::body::Bytes;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while preloading static assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Directory traversal failed.
    #[error("walking static directory {path:?}: {source}")]
    Walk {
        /// Root being walked.
        path: PathBuf,
        /// Underlying traversal error.
        #[source]
        source: walkdir::Error,
    },
    /// An asset could not be read.
    #[error("reading static asset {path:?}: {source}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A preloaded file.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Hex-encoded SHA-256 of the content.
    pub etag: String,
    /// MIME type derived from the file extension.
    pub content_type: &'static str,
    /// Raw file content.
    pub content: Bytes,
}

impl Asset {
    fn new(path: &Path, content: Vec<u8>) -> Self {
        let etag = hex::encode(Sha256::digest(&content));
        Self {
            etag,
            content_type: content_type_for(path),
            content: Bytes::from(content),
        }
    }

    /// Whether any of the client's `If-None-Match` values matches this asset.
    pub fn matches_etag<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> bool {
        candidates
            .into_iter()
            .flat_map(|value| value.split(','))
            .map(|value| value.trim().trim_matches('"'))
            .any(|value| value == self.etag || value == "*")
    }
}

/// Static assets keyed by request path.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: HashMap<String, Asset>,
}

impl AssetStore {
    /// Read every regular file under `root` into memory.
    pub fn load(root: &Path) -> Result<Self, AssetError> {
        let mut assets = HashMap::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|source| AssetError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let content = std::fs::read(path).map_err(|source| AssetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let key = asset_key(root, path);
            let asset = Asset::new(path, content);
            tracing::info!(
                path = %key,
                content_type = asset.content_type,
                etag = %asset.etag,
                "Added static asset"
            );
            assets.insert(key, asset);
        }
        Ok(Self { assets })
    }

    /// Look up the asset for a request path. `/` resolves to `index.html`.
    pub fn get(&self, request_path: &str) -> Option<&Asset> {
        let trimmed = request_path.trim_start_matches('/');
        let key = if trimmed.is_empty() {
            "index.html"
        } else {
            trimmed
        };
        self.assets.get(key)
    }

    /// Number of assets held.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether no assets were loaded.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

fn asset_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
