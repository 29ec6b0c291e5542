//! Structured product image reference

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::sanitize_file_name;

/// Folder that bare image file names are placed under.
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// An image reference split into its base directory and sanitized file name.
///
/// Only joined into `"<dir>/<file_name>"` when serialized. An empty file name
/// means the product has no image and serializes as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ImagePath {
    dir: String,
    file_name: String,
}

impl ImagePath {
    /// Build a path from a directory and a raw file name.
    ///
    /// The file name is sanitized; an empty directory falls back to
    /// [`DEFAULT_IMAGE_DIR`].
    #[must_use]
    pub fn new(dir: &str, file_name: &str) -> Self {
        let dir = dir.trim().trim_end_matches('/');
        Self {
            dir: if dir.is_empty() {
                DEFAULT_IMAGE_DIR.to_string()
            } else {
                dir.to_string()
            },
            file_name: sanitize_file_name(file_name),
        }
    }

    /// A reference with no image.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(DEFAULT_IMAGE_DIR, "")
    }

    /// Parse a raw reference such as `kopi.jpg` or `assets/img/kopi.jpg`.
    ///
    /// Everything up to the last `/` is kept as the directory; the remainder is
    /// sanitized as a file name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.rfind('/') {
            Some(index) => Self::new(&raw[..index], &raw[index + 1..]),
            None => Self::new(DEFAULT_IMAGE_DIR, raw),
        }
    }

    /// Replace the file name while keeping the current directory.
    pub fn with_file_name(&self, raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::Validation(
                "Image name cannot be empty".to_string(),
            ));
        }
        let file_name = sanitize_file_name(raw);
        if file_name.is_empty() {
            return Err(Error::Validation(format!(
                "Image name '{raw}' has no usable characters"
            )));
        }
        Ok(Self {
            dir: self.dir.clone(),
            file_name,
        })
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Whether this reference points at no file.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty()
    }
}

impl Default for ImagePath {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file_name.is_empty() {
            Ok(())
        } else {
            write!(f, "{}/{}", self.dir, self.file_name)
        }
    }
}

impl From<String> for ImagePath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ImagePath> for String {
    fn from(path: ImagePath) -> Self {
        path.to_string()
    }
}
