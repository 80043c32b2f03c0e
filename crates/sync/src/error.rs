use std::path::PathBuf;

use slugline_document::{DocumentId, ParseError};

/// Failures of user-invoked commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
	/// Neither a focused preview nor a screenplay editor is available.
	#[error("no active screenplay document")]
	NoActiveDocument,
	#[error("no editor is showing {0}")]
	EditorUnavailable(DocumentId),
	#[error("{0} is not a local file")]
	NotAFile(DocumentId),
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error("export to {} failed: {reason}", path.display())]
	Export { path: PathBuf, reason: String },
}
