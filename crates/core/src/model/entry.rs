use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::EntryId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("entry name must not be empty")]
    EmptyName,

    #[error("invalid image url: {0}")]
    InvalidImageUrl(String),
}

/// A single entry from the external catalog.
///
/// Parsed once at the collaborator boundary; everything past that boundary
/// works with this typed shape only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: EntryId,
    name: String,
    image_url: String,
}

impl Entry {
    /// Build a validated entry.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::EmptyName` if the name is blank, or
    /// `EntryError::InvalidImageUrl` if the image reference is not a
    /// parseable URL.
    pub fn new(
        id: EntryId,
        name: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Result<Self, EntryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EntryError::EmptyName);
        }

        let image_url = image_url.into();
        if Url::parse(&image_url).is_err() {
            return Err(EntryError::InvalidImageUrl(image_url));
        }

        Ok(Self {
            id,
            name,
            image_url,
        })
    }

    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }
}
