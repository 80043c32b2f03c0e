//! Collaborators the pipeline drives but does not render itself.

use std::sync::Arc;

use lsp_types::Diagnostic;
use slugline_document::{DocumentId, DocumentSummary, LineNumber};

/// Scene and character outline view.
pub trait OutlineView: Send + Sync {
	fn refresh(&self, summary: &DocumentSummary);
}

/// Per-document diagnostic collection. Each call replaces the document's list.
pub trait DiagnosticSink: Send + Sync {
	fn set_diagnostics(&self, document: &DocumentId, diagnostics: Vec<Diagnostic>);
}

/// Status bar item showing the estimated running time.
pub trait StatusIndicator: Send + Sync {
	fn show_status(&self, text: &str, tooltip: &str);
	fn hide_status(&self);
}

/// Text editor operations used by commands.
pub trait EditorCommands: Send + Sync {
	/// Moves the caret to `line` and scrolls it into view. Returns `false` when
	/// no editor shows `document`.
	fn reveal_line(&self, document: &DocumentId, line: LineNumber) -> bool;

	/// Current text of `document`, if an editor holds it.
	fn document_text(&self, document: &DocumentId) -> Option<String>;
}

/// Everything the pipeline calls out to.
#[derive(Clone)]
pub struct Collaborators {
	pub outline: Arc<dyn OutlineView>,
	pub diagnostics: Arc<dyn DiagnosticSink>,
	pub status: Arc<dyn StatusIndicator>,
	pub editor: Arc<dyn EditorCommands>,
}

impl std::fmt::Debug for Collaborators {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Collaborators").finish_non_exhaustive()
	}
}
