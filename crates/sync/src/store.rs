//! Per-document state owned by the pipeline.
//!
//! The parse cache, font state, diagnostics and open epochs live together in
//! one [`DocumentStore`] so that replacing a cache entry and checking the
//! font transition happen in one critical section.

use std::collections::HashMap;
use std::sync::Arc;

use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};
use slugline_document::{
	DocumentId, FontDeclaration, FontTracker, FontTransition, LineNumber, ParseCache, ParseError, ParsedDocument, ParserConfig,
	RenderMode,
};
use tracing::debug;

/// `source` of every diagnostic published by the pipeline.
pub const DIAGNOSTIC_SOURCE: &str = "slugline";

/// Diagnostic code for a failed parse.
pub const PARSE_FAILURE_CODE: &str = "parse-failure";

/// Diagnostic code for a declared font the preview could not load.
pub const FONT_UNAVAILABLE_CODE: &str = "font-unavailable";

/// Process-unique number assigned when a document is first seen.
///
/// A parse started under one epoch only commits while the document still has
/// that epoch, so results for closed (or closed and reopened) documents are
/// dropped.
pub type DocumentEpoch = u64;

#[derive(Debug, Default)]
struct DocumentDiagnostics {
	parse_failure: Option<Diagnostic>,
	font: Option<Diagnostic>,
}

impl DocumentDiagnostics {
	fn to_vec(&self) -> Vec<Diagnostic> {
		self.parse_failure.iter().chain(self.font.iter()).cloned().collect()
	}
}

/// Latest text submitted for a document, kept so it can be parsed again
/// without the editor resending it.
#[derive(Debug, Clone)]
pub struct DocumentSource {
	pub text: Arc<str>,
	pub config: ParserConfig,
}

/// Outcome of committing a parse.
#[derive(Debug)]
pub struct Commit {
	pub transition: FontTransition,
	/// Diagnostics to publish for the document after this parse.
	pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
	cache: ParseCache,
	/// Documents whose cached parse carries rendered HTML.
	rendered: HashMap<DocumentId, bool>,
	sources: HashMap<DocumentId, DocumentSource>,
	fonts: FontTracker,
	epochs: HashMap<DocumentId, DocumentEpoch>,
	diagnostics: HashMap<DocumentId, DocumentDiagnostics>,
	next_epoch: DocumentEpoch,
}

impl DocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks `document` open and returns its epoch.
	pub fn ensure_open(&mut self, document: &DocumentId) -> DocumentEpoch {
		if let Some(epoch) = self.epochs.get(document) {
			return *epoch;
		}
		self.next_epoch += 1;
		let epoch = self.next_epoch;
		debug!(document = %document, epoch, "document opened");
		self.epochs.insert(document.clone(), epoch);
		epoch
	}

	/// Remembers the text of the latest change notification for `document`.
	pub fn record_source(&mut self, document: &DocumentId, text: &str, config: &ParserConfig) {
		self.sources.insert(
			document.clone(),
			DocumentSource {
				text: Arc::from(text),
				config: config.clone(),
			},
		);
	}

	pub fn source(&self, document: &DocumentId) -> Option<DocumentSource> {
		self.sources.get(document).cloned()
	}

	/// Whether the cached parse of `document` was produced with
	/// [`RenderMode::Full`].
	pub fn is_rendered(&self, document: &DocumentId) -> bool {
		self.rendered.get(document).copied().unwrap_or(false)
	}

	pub fn is_open(&self, document: &DocumentId) -> bool {
		self.epochs.contains_key(document)
	}

	pub fn is_current(&self, document: &DocumentId, epoch: DocumentEpoch) -> bool {
		self.epochs.get(document) == Some(&epoch)
	}

	/// Stores a successful parse and runs the font transition check.
	///
	/// Returns `None` without touching anything when the epoch is stale.
	pub fn commit(
		&mut self,
		document: &DocumentId,
		epoch: DocumentEpoch,
		parsed: Arc<ParsedDocument>,
		render: RenderMode,
	) -> Option<Commit> {
		if !self.is_current(document, epoch) {
			return None;
		}

		let transition = self.fonts.detect(document, &parsed);
		let diagnostics = self.diagnostics.entry(document.clone()).or_default();
		diagnostics.parse_failure = None;
		match (&transition, &parsed.font) {
			(FontTransition::Declared(_) | FontTransition::Removed { .. }, _) => diagnostics.font = None,
			(FontTransition::Unchanged, Some(font)) => {
				if let Some(font_diagnostic) = diagnostics.font.as_mut() {
					font_diagnostic.range = line_range(font.line);
				}
			}
			(FontTransition::Unchanged, None) => {}
		}
		let diagnostics = diagnostics.to_vec();
		self.cache.put(document.clone(), parsed);
		self.rendered.insert(document.clone(), render.renders());

		Some(Commit { transition, diagnostics })
	}

	/// Records a parse failure and returns the diagnostics to publish.
	///
	/// The cached parse is left as it was.
	pub fn record_failure(&mut self, document: &DocumentId, epoch: DocumentEpoch, error: &ParseError) -> Option<Vec<Diagnostic>> {
		if !self.is_current(document, epoch) {
			return None;
		}
		let diagnostics = self.diagnostics.entry(document.clone()).or_default();
		diagnostics.parse_failure = Some(line_diagnostic(
			error.line().unwrap_or(0),
			DiagnosticSeverity::ERROR,
			PARSE_FAILURE_CODE,
			error.to_string(),
		));
		Some(diagnostics.to_vec())
	}

	/// Anchors a warning at the font declaration when a preview failed to load
	/// the declared font. `None` when no font is declared.
	pub fn font_unavailable(&mut self, document: &DocumentId) -> Option<Vec<Diagnostic>> {
		let font = self.fonts.current(document)?.clone();
		let diagnostics = self.diagnostics.entry(document.clone()).or_default();
		diagnostics.font = Some(line_diagnostic(
			font.line,
			DiagnosticSeverity::WARNING,
			FONT_UNAVAILABLE_CODE,
			format!("font \"{}\" could not be loaded; the preview uses the default font", font.name),
		));
		Some(diagnostics.to_vec())
	}

	/// Drops every piece of state for `document`. Returns whether it was open.
	pub fn close(&mut self, document: &DocumentId) -> bool {
		let was_open = self.epochs.remove(document).is_some();
		self.cache.remove(document);
		self.rendered.remove(document);
		self.sources.remove(document);
		self.fonts.forget(document);
		self.diagnostics.remove(document);
		if was_open {
			debug!(document = %document, "document closed");
		}
		was_open
	}

	pub fn parsed(&self, document: &DocumentId) -> Option<Arc<ParsedDocument>> {
		self.cache.get(document)
	}

	pub fn font(&self, document: &DocumentId) -> Option<&FontDeclaration> {
		self.fonts.current(document)
	}

	pub fn diagnostics(&self, document: &DocumentId) -> Vec<Diagnostic> {
		self.diagnostics.get(document).map(DocumentDiagnostics::to_vec).unwrap_or_default()
	}

	pub fn cache(&self) -> &ParseCache {
		&self.cache
	}
}

fn line_range(line: LineNumber) -> Range {
	Range::new(Position::new(line, 0), Position::new(line.saturating_add(1), 0))
}

fn line_diagnostic(line: LineNumber, severity: DiagnosticSeverity, code: &str, message: String) -> Diagnostic {
	Diagnostic {
		range: line_range(line),
		severity: Some(severity),
		code: Some(NumberOrString::String(code.to_owned())),
		source: Some(DIAGNOSTIC_SOURCE.to_owned()),
		message,
		..Diagnostic::default()
	}
}

/// Whether `diagnostic` was published by the pipeline with `code`.
pub fn has_code(diagnostic: &Diagnostic, code: &str) -> bool {
	matches!(&diagnostic.code, Some(NumberOrString::String(value)) if value == code)
}
