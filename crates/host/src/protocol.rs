//! Wire format of the stdio host: one JSON object per line in each direction.

use std::path::PathBuf;

use lsp_types::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slugline_document::{DocumentId, DocumentSummary, LineNumber};
use slugline_preview::PreviewMessage;
use slugline_sync::EditorFocus;

/// Event read from stdin, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HostEvent {
	Open {
		uri: DocumentId,
		text: String,
	},
	Change {
		uri: DocumentId,
		text: String,
	},
	Close {
		uri: DocumentId,
	},
	Focus(EditorFocus),
	OpenPreview {
		uri: DocumentId,
		/// Follow the last reparsed document instead of staying on `uri`.
		#[serde(default)]
		dynamic: bool,
	},
	ClosePreview {
		preview: u64,
	},
	PreviewFocus {
		preview: u64,
		focused: bool,
	},
	JumpTo {
		line: LineNumber,
	},
	FontUnavailable {
		uri: DocumentId,
	},
	/// Enter typed in an editor; answered with [`HostOutput::Caret`].
	#[serde(rename_all = "camelCase")]
	Newline {
		line_text: String,
		caret: usize,
	},
	/// Exports the active document. Prompts come back as
	/// [`HostOutput::PickCharacters`] and [`HostOutput::ChooseSavePath`].
	#[serde(rename_all = "camelCase")]
	ExportPdf {
		#[serde(default)]
		highlight_characters: bool,
		#[serde(default = "show_save_dialog")]
		show_save_dialog: bool,
	},
	/// Reply to a prompt; `null` cancels it.
	Answer {
		request: u64,
		#[serde(default)]
		value: Value,
	},
}

fn show_save_dialog() -> bool {
	true
}

/// Update written to stdout, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HostOutput {
	PreviewOpened {
		preview: u64,
		uri: DocumentId,
	},
	Preview {
		preview: u64,
		message: PreviewMessage,
	},
	Outline {
		summary: DocumentSummary,
	},
	Diagnostics {
		uri: DocumentId,
		diagnostics: Vec<Diagnostic>,
	},
	Status {
		text: String,
		tooltip: String,
	},
	HideStatus,
	Reveal {
		uri: DocumentId,
		line: LineNumber,
	},
	/// Where the caret should go before the newline is inserted; `None`
	/// leaves it alone.
	Caret {
		column: Option<usize>,
	},
	Telemetry {
		event: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		metadata: Option<Value>,
	},
	/// Multi-select over `characters`; answer with the picked names.
	PickCharacters {
		request: u64,
		characters: Vec<String>,
	},
	/// Save dialog; answer with the chosen path.
	ChooseSavePath {
		request: u64,
		suggested: PathBuf,
	},
	/// Rendered markup the editor prints to `path`.
	RenderPdf {
		path: PathBuf,
		title: String,
		script: String,
		highlighted: Vec<String>,
	},
	Exported {
		path: PathBuf,
	},
	ExportCancelled,
	Error {
		message: String,
	},
}
