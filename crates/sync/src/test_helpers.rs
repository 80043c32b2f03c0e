//! Recording collaborators and scripted parsers for pipeline tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lsp_types::Diagnostic;
use parking_lot::Mutex;
use serde_json::Value;
use slugline_document::{DocumentId, DocumentSummary, LineNumber, ParseError, ParsedDocument, ParserConfig, RenderMode, ScreenplayParser};
use slugline_parser::FountainParser;
use slugline_preview::{PreviewMessage, PreviewReceiver};
use tokio::sync::oneshot;

use crate::collab::{Collaborators, DiagnosticSink, EditorCommands, OutlineView, StatusIndicator};
use crate::config::TelemetryConfig;
use crate::pipeline::ScreenplaySync;
use crate::telemetry::{Telemetry, TelemetryError, TelemetryTransport};

/// What the status item was last asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCall {
	Show { text: String, tooltip: String },
	Hide,
}

/// Records every collaborator call.
#[derive(Default)]
pub struct Recorder {
	pub outlines: Mutex<Vec<DocumentSummary>>,
	pub diagnostics: Mutex<Vec<(DocumentId, Vec<Diagnostic>)>>,
	pub status: Mutex<Vec<StatusCall>>,
	pub reveals: Mutex<Vec<(DocumentId, LineNumber)>>,
	texts: Mutex<HashMap<DocumentId, String>>,
}

impl Recorder {
	/// Makes `document` visible to editor commands with `text`.
	pub fn set_text(&self, document: &DocumentId, text: &str) {
		self.texts.lock().insert(document.clone(), text.to_owned());
	}

	pub fn last_diagnostics(&self, document: &DocumentId) -> Option<Vec<Diagnostic>> {
		self.diagnostics
			.lock()
			.iter()
			.rev()
			.find(|(published, _)| published == document)
			.map(|(_, diagnostics)| diagnostics.clone())
	}

	pub fn last_status(&self) -> Option<StatusCall> {
		self.status.lock().last().cloned()
	}
}

impl OutlineView for Recorder {
	fn refresh(&self, summary: &DocumentSummary) {
		self.outlines.lock().push(summary.clone());
	}
}

impl DiagnosticSink for Recorder {
	fn set_diagnostics(&self, document: &DocumentId, diagnostics: Vec<Diagnostic>) {
		self.diagnostics.lock().push((document.clone(), diagnostics));
	}
}

impl StatusIndicator for Recorder {
	fn show_status(&self, text: &str, tooltip: &str) {
		self.status.lock().push(StatusCall::Show {
			text: text.to_owned(),
			tooltip: tooltip.to_owned(),
		});
	}

	fn hide_status(&self) {
		self.status.lock().push(StatusCall::Hide);
	}
}

impl EditorCommands for Recorder {
	fn reveal_line(&self, document: &DocumentId, line: LineNumber) -> bool {
		if !self.texts.lock().contains_key(document) {
			return false;
		}
		self.reveals.lock().push((document.clone(), line));
		true
	}

	fn document_text(&self, document: &DocumentId) -> Option<String> {
		self.texts.lock().get(document).cloned()
	}
}

#[derive(Default)]
pub struct RecordingTransport(Mutex<Vec<(String, Option<Value>)>>);

impl RecordingTransport {
	pub fn events(&self) -> Vec<String> {
		self.0.lock().iter().map(|(event, _)| event.clone()).collect()
	}

	pub fn reports(&self) -> Vec<(String, Option<Value>)> {
		self.0.lock().clone()
	}
}

impl TelemetryTransport for RecordingTransport {
	fn report(&self, event: &str, metadata: Option<Value>) -> Result<(), TelemetryError> {
		self.0.lock().push((event.to_owned(), metadata));
		Ok(())
	}
}

/// Fountain parser whose calls for selected texts block until released.
#[derive(Default)]
pub struct GatedParser {
	gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
	pub renders: Mutex<Vec<RenderMode>>,
}

impl GatedParser {
	/// The next parse of `text` waits until the returned sender fires.
	pub fn gate(&self, text: &str) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();
		self.gates.lock().insert(text.to_owned(), rx);
		tx
	}
}

#[async_trait]
impl ScreenplayParser for GatedParser {
	async fn parse(&self, text: &str, config: &ParserConfig, render: RenderMode) -> Result<ParsedDocument, ParseError> {
		self.renders.lock().push(render);
		let gate = self.gates.lock().remove(text);
		if let Some(gate) = gate {
			let _ = gate.await;
		}
		FountainParser.parse(text, config, render).await
	}
}

pub struct Harness {
	pub sync: Arc<ScreenplaySync>,
	pub recorder: Arc<Recorder>,
	pub telemetry: Arc<RecordingTransport>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_parser(Arc::new(FountainParser), TelemetryConfig::default())
	}

	pub fn with_parser(parser: Arc<dyn ScreenplayParser>, telemetry_config: TelemetryConfig) -> Self {
		let recorder = Arc::new(Recorder::default());
		let telemetry = Arc::new(RecordingTransport::default());
		let collaborators = Collaborators {
			outline: recorder.clone(),
			diagnostics: recorder.clone(),
			status: recorder.clone(),
			editor: recorder.clone(),
		};
		let sync = ScreenplaySync::new(parser, collaborators, Telemetry::new(telemetry.clone(), &telemetry_config));
		Self {
			sync: Arc::new(sync),
			recorder,
			telemetry,
		}
	}
}

pub fn doc(name: &str) -> DocumentId {
	DocumentId::parse(&format!("file:///{name}.fountain")).unwrap()
}

/// Every message queued for a preview so far.
pub fn drain(rx: &mut PreviewReceiver) -> Vec<PreviewMessage> {
	let mut messages = Vec::new();
	while let Ok(message) = rx.try_recv() {
		messages.push(message);
	}
	messages
}

/// Message kinds, for compact sequence assertions.
pub fn kinds(messages: &[PreviewMessage]) -> Vec<&'static str> {
	messages.iter().map(PreviewMessage::kind).collect()
}
