//! Resolution of catalog-relative asset references and fetching of their bytes.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::AssetError;

/// A concrete, loadable location for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetLocator {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for AssetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLocator::File(path) => write!(f, "{}", path.display()),
            AssetLocator::Url(url) => f.write_str(url),
        }
    }
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Maps relative references (`images/davul.png`) onto a fixed asset base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    base: AssetLocator,
}

impl AssetResolver {
    /// `base` is either a directory or an http(s) URL.
    pub fn new(base: &str) -> Self {
        let base = if is_url(base) {
            AssetLocator::Url(base.trim_end_matches('/').to_string())
        } else {
            AssetLocator::File(PathBuf::from(base))
        };
        Self { base }
    }

    pub fn base(&self) -> &AssetLocator {
        &self.base
    }

    pub fn resolve(&self, reference: &str) -> Result<AssetLocator, AssetError> {
        let unresolvable = || AssetError::Unresolvable {
            reference: reference.to_string(),
        };

        let trimmed = reference.trim().trim_start_matches('/');
        if trimmed.is_empty() || trimmed.contains("://") || trimmed.contains('\\') {
            return Err(unresolvable());
        }
        if trimmed.split('/').any(|seg| seg == "..") {
            return Err(unresolvable());
        }

        Ok(match &self.base {
            AssetLocator::File(dir) => {
                AssetLocator::File(trimmed.split('/').filter(|s| !s.is_empty()).fold(
                    dir.clone(),
                    |mut acc, seg| {
                        acc.push(seg);
                        acc
                    },
                ))
            }
            AssetLocator::Url(url) => AssetLocator::Url(format!("{url}/{trimmed}")),
        })
    }
}

/// Largest remote asset accepted. Audio clips routinely exceed the HTTP
/// client's default 10 MiB body cap.
pub const MAX_REMOTE_ASSET_BYTES: u64 = 64 * 1024 * 1024;

/// Reads the bytes behind a locator.
pub fn fetch_bytes(locator: &AssetLocator) -> Result<Vec<u8>, AssetError> {
    match locator {
        AssetLocator::File(path) => read_file(path),
        AssetLocator::Url(url) => {
            debug!("Fetching {url}");
            Ok(ureq::get(url)
                .call()?
                .body_mut()
                .with_config()
                .limit(MAX_REMOTE_ASSET_BYTES)
                .read_to_vec()?)
        }
    }
}

/// Reads a locator as UTF-8 text.
pub fn fetch_text(locator: &AssetLocator) -> Result<String, AssetError> {
    match locator {
        AssetLocator::File(path) => Ok(fs::read_to_string(path)?),
        AssetLocator::Url(url) => {
            debug!("Fetching {url}");
            Ok(ureq::get(url).call()?.body_mut().read_to_string()?)
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, AssetError> {
    Ok(fs::read(path)?)
}
