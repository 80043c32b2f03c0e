//! Active-document resolution.

use serde::{Deserialize, Serialize};
use slugline_document::DocumentId;
use slugline_preview::PreviewRegistry;

/// Language id of screenplay documents.
pub const SCREENPLAY_LANGUAGE: &str = "fountain";

/// A text editor showing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
	pub document: DocumentId,
	pub language_id: String,
}

impl EditorView {
	pub fn new(document: DocumentId, language_id: impl Into<String>) -> Self {
		Self {
			document,
			language_id: language_id.into(),
		}
	}

	pub fn is_screenplay(&self) -> bool {
		self.language_id == SCREENPLAY_LANGUAGE
	}
}

/// Snapshot of editor focus as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorFocus {
	/// Editor holding keyboard focus.
	pub active: Option<EditorView>,
	/// Visible editors in the host's enumeration order.
	#[serde(default)]
	pub visible: Vec<EditorView>,
}

/// Picks the document commands should act on.
///
/// Priority: a focused preview, then the focused screenplay editor, then the
/// first visible screenplay editor.
pub fn resolve_active_document(previews: &PreviewRegistry, focus: &EditorFocus) -> Option<DocumentId> {
	if let Some(preview) = previews.focused() {
		return Some(preview.document().clone());
	}
	if let Some(active) = focus.active.as_ref().filter(|view| view.is_screenplay()) {
		return Some(active.document.clone());
	}
	focus.visible.iter().find(|view| view.is_screenplay()).map(|view| view.document.clone())
}
