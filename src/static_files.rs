//! Filesystem collaborator for catch-all file routes.
//!
//! The router itself never touches the filesystem; `serve_files` registers
//! a `*filepath` catch-all and delegates the capture to a handler like
//! [`StaticFiles`], which maps it onto a base directory safely.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Maps `*filepath` captures onto a directory tree, rejecting traversal.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    /// Serve files from `base`.
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    /// Resolve a `filepath` capture to a path under the base directory.
    ///
    /// Returns `None` for captures that escape the base directory via `..`
    /// or non-normal components.
    #[must_use]
    pub fn resolve(&self, capture: &str) -> Option<PathBuf> {
        let clean = capture.trim_start_matches('/');
        let mut resolved = self.base_dir.clone();
        for comp in Path::new(clean).components() {
            match comp {
                Component::Normal(s) => resolved.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }

    /// Content type for a file path, by extension.
    #[must_use]
    pub fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "ico" => "image/x-icon",
            "txt" => "text/plain",
            "wasm" => "application/wasm",
            _ => "application/octet-stream",
        }
    }

    /// Read the file a capture refers to, together with its content type.
    pub fn read(&self, capture: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self.resolve(capture).ok_or_else(|| {
            io::Error::new(io::ErrorKind::PermissionDenied, "path escapes base directory")
        })?;
        let body = fs::read(&path)?;
        Ok((body, Self::content_type(&path)))
    }
}
