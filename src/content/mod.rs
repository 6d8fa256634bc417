//! Static content provider.
//!
//! Narrow collaborator contract: `resolve(path)` returns bytes and a content
//! type, or `NotFound`. The gateway never inspects the content itself. Page
//! routes resolve fixed files; the fallback handler resolves arbitrary asset
//! paths under the configured public directory.

use std::io;
use std::path::PathBuf;

/// A resolved piece of static content.
#[derive(Debug, Clone)]
pub struct StaticContent {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Failures while resolving static content.
#[derive(Debug)]
pub enum ContentError {
    NotFound,
    Io(io::Error),
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentError::NotFound => write!(f, "content not found"),
            ContentError::Io(e) => write!(f, "content read failed: {}", e),
        }
    }
}

impl std::error::Error for ContentError {}

/// Filesystem-backed static content, rooted at a public directory.
pub struct StaticSite {
    root: PathBuf,
}

impl StaticSite {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a request path to content under the root.
    ///
    /// Paths containing a `..` component are treated as not found, so the
    /// provider can never serve anything outside its root.
    pub async fn resolve(&self, path: &str) -> Result<StaticContent, ContentError> {
        let relative = path.trim_start_matches('/');
        let relative = if relative.is_empty() { "index.html" } else { relative };
        if relative.split('/').any(|segment| segment == "..") {
            return Err(ContentError::NotFound);
        }

        let full = self.root.join(relative);
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(ContentError::NotFound),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ContentError::NotFound),
            Err(e) => return Err(ContentError::Io(e)),
        }

        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(StaticContent {
                bytes,
                content_type: content_type_for(relative),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ContentError::NotFound),
            Err(e) => Err(ContentError::Io(e)),
        }
    }
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
