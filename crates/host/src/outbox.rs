//! Outputs produced by collaborators between two flushes of the session.

use std::collections::HashMap;

use lsp_types::Diagnostic;
use parking_lot::Mutex;
use serde_json::Value;
use slugline_document::{DocumentId, DocumentSummary, LineNumber};
use slugline_sync::{DiagnosticSink, EditorCommands, OutlineView, StatusIndicator, TelemetryError, TelemetryTransport};
use tokio::sync::Notify;

use crate::protocol::HostOutput;

/// Queued outputs plus the editor texts the host last reported.
///
/// Every push wakes [`Outbox::ready`], so outputs produced by background
/// work (an export waiting on prompts) are flushed without a new event.
#[derive(Default)]
pub(crate) struct Outbox {
	outputs: Mutex<Vec<HostOutput>>,
	pub(crate) texts: Mutex<HashMap<DocumentId, String>>,
	ready: Notify,
}

impl Outbox {
	pub(crate) fn push(&self, output: HostOutput) {
		self.outputs.lock().push(output);
		self.ready.notify_one();
	}

	pub(crate) fn take(&self) -> Vec<HostOutput> {
		std::mem::take(&mut *self.outputs.lock())
	}

	/// Resolves once something was pushed since the previous wakeup.
	pub(crate) async fn ready(&self) {
		self.ready.notified().await;
	}
}

impl OutlineView for Outbox {
	fn refresh(&self, summary: &DocumentSummary) {
		self.push(HostOutput::Outline { summary: summary.clone() });
	}
}

impl DiagnosticSink for Outbox {
	fn set_diagnostics(&self, document: &DocumentId, diagnostics: Vec<Diagnostic>) {
		self.push(HostOutput::Diagnostics {
			uri: document.clone(),
			diagnostics,
		});
	}
}

impl StatusIndicator for Outbox {
	fn show_status(&self, text: &str, tooltip: &str) {
		self.push(HostOutput::Status {
			text: text.to_owned(),
			tooltip: tooltip.to_owned(),
		});
	}

	fn hide_status(&self) {
		self.push(HostOutput::HideStatus);
	}
}

impl EditorCommands for Outbox {
	fn reveal_line(&self, document: &DocumentId, line: LineNumber) -> bool {
		if !self.texts.lock().contains_key(document) {
			return false;
		}
		self.push(HostOutput::Reveal {
			uri: document.clone(),
			line,
		});
		true
	}

	fn document_text(&self, document: &DocumentId) -> Option<String> {
		self.texts.lock().get(document).cloned()
	}
}

impl TelemetryTransport for Outbox {
	fn report(&self, event: &str, metadata: Option<Value>) -> Result<(), TelemetryError> {
		self.push(HostOutput::Telemetry {
			event: event.to_owned(),
			metadata,
		});
		Ok(())
	}
}
