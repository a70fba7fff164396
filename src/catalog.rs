//! Catalog loading.
//!
//! Fetches the declarative catalog document once and normalizes it into a
//! [`Catalog`]. The document looks like this (YAML shown; JSON and TOML carry
//! the same shape):
//!
//! ```yaml
//! images:
//!   - src: bollard_314.jpg
//!     alt: Bollard in Italy
//!     name: italy
//!     colors: [red, white]
//!     continent: Europe
//!     side: right            # or [left, right]
//! ```
//!
//! ## Normalization
//!
//! Every key other than `src`, `alt` and `name` is a tag dimension. A string
//! becomes a one-element set and a list becomes a set, so the facet engine
//! never sees the difference. Values of any other shape (numbers, maps, null)
//! are skipped. Dimensions that mix strings and lists across items are
//! accepted but logged, since the document's author probably meant one or the
//! other.
//!
//! ## Locations
//!
//! A location is either an `http://`/`https://` URL, fetched with reqwest, or a
//! filesystem path. A deployment prefix (`base_path`) is prepended to
//! everything that is not already a URL. The format follows the extension:
//! `.json`, `.toml`, and YAML for everything else.

use crate::types::{Catalog, CatalogItem};
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Catalog schema error: {0}")]
    Schema(String),
}

// ============================================================================
// Locations and formats
// ============================================================================

/// Serialization format of the catalog document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Yaml,
    Json,
    Toml,
}

impl CatalogFormat {
    /// Pick the format from the extension of `location`, ignoring any URL
    /// query or fragment. Unknown or missing extensions read as YAML.
    pub fn from_location(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => CatalogFormat::Json,
            Some("toml") => CatalogFormat::Toml,
            _ => CatalogFormat::Yaml,
        }
    }
}

/// Where the catalog document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Path(PathBuf),
    Url(String),
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

impl CatalogSource {
    /// Combine a configured location with the deployment prefix.
    ///
    /// URLs are used as given. Anything else is joined under `base_path`,
    /// which may itself be a URL or a directory.
    pub fn resolve(location: &str, base_path: &str) -> Self {
        if is_url(location) {
            return CatalogSource::Url(location.to_string());
        }
        let base = base_path.trim_end_matches('/');
        if is_url(base) {
            return CatalogSource::Url(format!("{base}/{}", location.trim_start_matches('/')));
        }
        if base.is_empty() {
            CatalogSource::Path(PathBuf::from(location))
        } else {
            CatalogSource::Path(Path::new(base).join(location.trim_start_matches('/')))
        }
    }

    pub fn format(&self) -> CatalogFormat {
        match self {
            CatalogSource::Path(path) => CatalogFormat::from_location(&path.to_string_lossy()),
            CatalogSource::Url(url) => CatalogFormat::from_location(url),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Path(path) => write!(f, "{}", path.display()),
            CatalogSource::Url(url) => f.write_str(url),
        }
    }
}

/// Final location of an image asset: `base_path` / `image_dir` / `src`.
///
/// Absolute URLs in `src` are returned unchanged. The result is root-relative
/// unless `base_path` is a URL. The asset is not checked for existence.
pub fn resolve_asset(base_path: &str, image_dir: &str, src: &str) -> String {
    if is_url(src) {
        return src.to_string();
    }
    let joined = [base_path, image_dir, src]
        .iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if is_url(base_path) {
        joined
    } else {
        format!("/{joined}")
    }
}

// ============================================================================
// Document parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    images: Vec<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    src: String,
    #[serde(default)]
    alt: String,
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    tags: BTreeMap<String, RawTag>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTag {
    One(String),
    Many(Vec<String>),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

/// Parse a catalog document already in memory.
pub fn parse_catalog(text: &str, format: CatalogFormat) -> Result<Catalog, CatalogError> {
    let raw: RawCatalog = match format {
        CatalogFormat::Yaml => serde_yaml::from_str(text)?,
        CatalogFormat::Json => serde_json::from_str(text)?,
        CatalogFormat::Toml => toml::from_str(text)?,
    };
    let (catalog, mixed) = normalize(raw)?;
    for dimension in mixed {
        warn!(
            dimension = %dimension,
            "catalog mixes single values and lists for one dimension"
        );
    }
    Ok(catalog)
}

/// Convert raw images into items; also returns dimensions with mixed shapes.
fn normalize(raw: RawCatalog) -> Result<(Catalog, Vec<String>), CatalogError> {
    let mut single = BTreeSet::new();
    let mut list = BTreeSet::new();
    let mut items = Vec::with_capacity(raw.images.len());

    for (idx, image) in raw.images.into_iter().enumerate() {
        if image.src.trim().is_empty() {
            return Err(CatalogError::Schema(format!(
                "image #{} has an empty src",
                idx + 1
            )));
        }
        let mut item = CatalogItem::new(image.src, image.name, image.alt);
        for (dimension, tag) in image.tags {
            match tag {
                RawTag::One(value) => {
                    single.insert(dimension.clone());
                    item = item.with_tag(&dimension, [value]);
                }
                RawTag::Many(values) => {
                    list.insert(dimension.clone());
                    item = item.with_tag(&dimension, values);
                }
                RawTag::Other(_) => {
                    debug!(dimension = %dimension, image = idx + 1, "skipping non-string tag");
                }
            }
        }
        items.push(item);
    }

    let mixed = single.intersection(&list).cloned().collect();
    Ok((Catalog::new(items), mixed))
}

// ============================================================================
// Fetching
// ============================================================================

async fn read_source(source: &CatalogSource) -> Result<String, CatalogError> {
    match source {
        CatalogSource::Path(path) => Ok(tokio::fs::read_to_string(path).await?),
        CatalogSource::Url(url) => {
            let response = reqwest::get(url).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::HttpStatus {
                    status,
                    url: url.clone(),
                });
            }
            Ok(response.text().await?)
        }
    }
}

/// Fetch and parse the catalog. Exactly one read per call, no retry.
pub async fn fetch_catalog(source: &CatalogSource) -> Result<Catalog, CatalogError> {
    let text = read_source(source).await?;
    let catalog = parse_catalog(&text, source.format())?;
    info!(source = %source, items = catalog.len(), "catalog loaded");
    Ok(catalog)
}
