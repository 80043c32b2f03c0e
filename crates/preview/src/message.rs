use serde::{Deserialize, Serialize};
use slugline_document::{DocumentId, LineNumber};

/// Message pushed to a preview consumer.
///
/// Serialized with a `command` tag so a webview can switch on it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PreviewMessage {
	/// Replace the rendered title page.
	UpdateTitle { content: String },
	/// Replace the rendered script body.
	UpdateScript { content: String },
	/// The consumer now shows another document.
	Rebind { uri: DocumentId },
	/// Use a custom font.
	UpdateFont { content: String },
	/// Go back to the default font.
	RemoveFont,
	/// Scroll to the element rendered from a source line.
	ScrollTo { content: LineNumber },
}

impl PreviewMessage {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::UpdateTitle { .. } => "updateTitle",
			Self::UpdateScript { .. } => "updateScript",
			Self::Rebind { .. } => "rebind",
			Self::UpdateFont { .. } => "updateFont",
			Self::RemoveFont => "removeFont",
			Self::ScrollTo { .. } => "scrollTo",
		}
	}
}
