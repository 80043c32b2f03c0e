//! Document identity.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

/// Errors produced when building a [`DocumentId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentIdError {
	/// The string is not a valid absolute URI.
	#[error("invalid document uri: {0}")]
	InvalidUri(#[from] url::ParseError),
	/// File paths must be absolute to map onto a `file://` URI.
	#[error("path is not absolute: {}", .0.display())]
	NotAbsolute(PathBuf),
}

/// Stable key for one editable document.
///
/// Holds the canonical (normalized) URI string, so two spellings of the same
/// URI compare equal. Stable across edits; the pipeline drops all state keyed
/// by it when the document closes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
	/// Parses and normalizes a URI string.
	pub fn parse(raw: &str) -> Result<Self, DocumentIdError> {
		let url = Url::parse(raw)?;
		Ok(Self(url.into()))
	}

	/// Builds a `file://` identity from an absolute path.
	pub fn from_path(path: &Path) -> Result<Self, DocumentIdError> {
		Url::from_file_path(path)
			.map(|url| Self(url.into()))
			.map_err(|()| DocumentIdError::NotAbsolute(path.to_path_buf()))
	}

	/// The canonical URI string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Local filesystem path, when the identity is a `file://` URI.
	pub fn to_file_path(&self) -> Option<PathBuf> {
		Url::parse(&self.0).ok()?.to_file_path().ok()
	}
}

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl TryFrom<String> for DocumentId {
	type Error = DocumentIdError;

	fn try_from(raw: String) -> Result<Self, Self::Error> {
		Self::parse(&raw)
	}
}

impl From<DocumentId> for String {
	fn from(id: DocumentId) -> Self {
		id.0
	}
}
