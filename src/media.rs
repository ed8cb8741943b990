//! Media files: on-disk storage for uploads and URL resolution for responses.
//!
//! Stored paths are always relative to the media root (e.g.
//! `properties/images/<uuid>-front.jpg`). Responses turn them into absolute
//! URLs using the host the client called us on.

use std::{
    convert::Infallible,
    path::{Component, Path, PathBuf},
};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const IMAGE_DIR: &str = "properties/images";
pub const VIDEO_DIR: &str = "properties/videos";

/// Scheme and host of the in-flight request, e.g. `https://listings.example`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin(pub Option<String>);

impl RequestOrigin {
    /// `X-Forwarded-Host`/`X-Forwarded-Proto` are only honoured when `trust_proxy` is set.
    pub fn from_headers(headers: &HeaderMap, trust_proxy: bool) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.split(',').next().unwrap_or("").trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let forwarded = |name: &str| if trust_proxy { header_str(name) } else { None };

        let host = forwarded("x-forwarded-host").or_else(|| header_str(header::HOST.as_str()));
        let scheme = forwarded("x-forwarded-proto").unwrap_or_else(|| "http".to_string());

        Self(host.map(|host| format!("{scheme}://{host}")))
    }
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(
            &parts.headers,
            state.config.trust_proxy_headers,
        ))
    }
}

/// Builds caller-resolvable URLs for stored media paths.
#[derive(Debug, Clone)]
pub struct MediaUrls {
    origin: Option<String>,
    media_url: String,
}

impl MediaUrls {
    pub fn new(origin: RequestOrigin, media_url: impl Into<String>) -> Self {
        Self {
            origin: origin.0,
            media_url: media_url.into(),
        }
    }

    /// Relative-only resolver, used when no request is in flight.
    pub fn relative(media_url: impl Into<String>) -> Self {
        Self::new(RequestOrigin::default(), media_url)
    }

    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let relative = format!(
            "{}/{}",
            self.media_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        match &self.origin {
            Some(origin) => format!("{}{}", origin.trim_end_matches('/'), relative),
            None => relative,
        }
    }
}

/// Local filesystem storage rooted at `MEDIA_ROOT`.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Absolute location of a stored key. Keys that could leave the media root are rejected.
    pub fn path_of(&self, key: &str) -> AppResult<PathBuf> {
        if !is_media_path(key) {
            return Err(AppError::Validation(format!("invalid media path `{key}`")));
        }
        Ok(self.root.join(key))
    }

    /// Write `data` under `dir` and return the stored relative path.
    pub async fn save(&self, dir: &str, original_name: &str, data: &[u8]) -> AppResult<String> {
        let key = format!(
            "{}/{}-{}",
            dir.trim_matches('/'),
            Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        );
        let path = self.path_of(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(anyhow::anyhow!("failed to create media directory: {e}"))
            })?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to write media file: {e}")))?;

        tracing::debug!(key = %key, bytes = data.len(), "stored media file");
        Ok(key)
    }

    /// Remove a stored file. Missing files are not an error.
    pub async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.path_of(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Internal(anyhow::anyhow!(
                "failed to remove media file: {err}"
            ))),
        }
    }
}

/// A relative path made only of plain components: no `..`, no root, no drive prefix.
pub fn is_media_path(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\\')
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Keep only the final path component and a conservative character set.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
