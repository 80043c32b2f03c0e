//! Reparse-and-propagate pipeline.
//!
//! [`ScreenplaySync`] owns the per-document state and the preview registry.
//! Every change notification reparses the whole document, replaces the cached
//! parse and pushes the result to previews and the outline, diagnostic and
//! status collaborators.
//!
//! Parses run summary-only while no preview wants the document. A preview
//! opened on top of such a parse, or while one is in flight, triggers a full
//! parse of the latest submitted text so it never starts from empty markup.
//!
//! Locks are `parking_lot` and never held across the parser await. Cache
//! replacement and font transition detection share one critical section in
//! [`DocumentStore::commit`]; messages go out after it is released.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use slugline_document::{
	DocumentId, FontDeclaration, FontTransition, ParseError, ParsedDocument, ParserConfig, RenderMode, ScreenplayParser, count_lines,
};
use slugline_preview::{PreviewBinding, PreviewId, PreviewMessage, PreviewRegistry, PreviewSender};
use tracing::{debug, trace, warn};

use crate::collab::Collaborators;
use crate::focus::{EditorFocus, resolve_active_document};
use crate::status::status_text;
use crate::store::{DocumentEpoch, DocumentStore};
use crate::telemetry::Telemetry;


/// What happened to one change notification.
#[derive(Debug)]
pub enum ReparseOutcome {
	/// The parse was cached and propagated.
	Applied {
		transition: FontTransition,
		/// Previews that received the new content, in registration order.
		notified: Vec<PreviewId>,
	},
	/// The parser failed; the previous parse stays cached.
	Failed(ParseError),
	/// The document was closed while the parse was in flight.
	Discarded,
}

impl ReparseOutcome {
	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied { .. })
	}
}

/// Screenplay synchronization coordinator.
pub struct ScreenplaySync {
	parser: Arc<dyn ScreenplayParser>,
	store: Mutex<DocumentStore>,
	pub(crate) previews: RwLock<PreviewRegistry>,
	focus: RwLock<EditorFocus>,
	pub(crate) collaborators: Collaborators,
	pub(crate) telemetry: Telemetry,
}

impl std::fmt::Debug for ScreenplaySync {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScreenplaySync")
			.field("previews", &self.previews.read().len())
			.field("cached", &self.store.lock().cache().len())
			.field("telemetry", &self.telemetry)
			.finish_non_exhaustive()
	}
}

impl ScreenplaySync {
	pub fn new(parser: Arc<dyn ScreenplayParser>, collaborators: Collaborators, telemetry: Telemetry) -> Self {
		Self {
			parser,
			store: Mutex::new(DocumentStore::new()),
			previews: RwLock::new(PreviewRegistry::new()),
			focus: RwLock::new(EditorFocus::default()),
			collaborators,
			telemetry,
		}
	}

	pub fn parser(&self) -> &Arc<dyn ScreenplayParser> {
		&self.parser
	}

	pub fn telemetry(&self) -> &Telemetry {
		&self.telemetry
	}

	/// Reparses `document` from its full text and propagates the result.
	pub async fn on_document_changed(&self, document: &DocumentId, text: &str, config: &ParserConfig) -> ReparseOutcome {
		let epoch = {
			let mut store = self.store.lock();
			let epoch = store.ensure_open(document);
			store.record_source(document, text, config);
			epoch
		};
		let render = RenderMode::for_consumers(self.has_interested_previews(document));
		let line_count = count_lines(text);

		let started = Instant::now();
		let result = self.parser.parse(text, config, render).await;
		let elapsed = started.elapsed();

		let outcome = match result {
			Ok(parsed) => self.apply(document, epoch, render, parsed),
			Err(error) => self.fail(document, epoch, error),
		};
		self.telemetry.record_parse(line_count, elapsed);
		outcome
	}

	fn apply(&self, document: &DocumentId, epoch: DocumentEpoch, render: RenderMode, parsed: ParsedDocument) -> ReparseOutcome {
		let parsed = Arc::new(parsed);
		let commit = self.store.lock().commit(document, epoch, parsed.clone(), render);
		let Some(commit) = commit else {
			debug!(document = %document, epoch, "discarding parse for closed document");
			return ReparseOutcome::Discarded;
		};
		debug!(
			document = %document,
			scenes = parsed.scenes.len(),
			characters = parsed.characters.len(),
			font = ?commit.transition,
			"document reparsed"
		);

		let notified = if render.renders() {
			self.notify_previews(document, &parsed, &commit.transition)
		} else {
			Vec::new()
		};

		self.collaborators.outline.refresh(&parsed.summary(document));
		self.collaborators.diagnostics.set_diagnostics(document, commit.diagnostics);
		self.refresh_status();

		ReparseOutcome::Applied {
			transition: commit.transition,
			notified,
		}
	}

	fn fail(&self, document: &DocumentId, epoch: DocumentEpoch, error: ParseError) -> ReparseOutcome {
		let diagnostics = self.store.lock().record_failure(document, epoch, &error);
		let Some(diagnostics) = diagnostics else {
			debug!(document = %document, epoch, "discarding parse failure for closed document");
			return ReparseOutcome::Discarded;
		};
		warn!(document = %document, error = %error, "parse failed, keeping previous result");
		self.collaborators.diagnostics.set_diagnostics(document, diagnostics);
		ReparseOutcome::Failed(error)
	}

	fn has_interested_previews(&self, document: &DocumentId) -> bool {
		let mut previews = self.previews.write();
		prune_closed(&mut previews);
		!previews.interested_in(document).is_empty()
	}

	/// Sends new content to every interested preview and returns their ids.
	///
	/// A preview that has not received anything yet gets the declared font
	/// instead of the transition, since it never saw the previous state.
	fn notify_previews(&self, document: &DocumentId, parsed: &ParsedDocument, transition: &FontTransition) -> Vec<PreviewId> {
		let mut previews = self.previews.write();
		prune_closed(&mut previews);
		let interested = previews.interested_in(document);
		let font_message = transition_message(transition);

		for id in &interested {
			let Some(consumer) = previews.get_mut(*id) else {
				continue;
			};
			let fresh = consumer.take_snapshot_pending();
			let mut messages = content_messages(parsed);
			let mut rebound = false;
			if consumer.binding().is_dynamic() {
				rebound = consumer.rebind(document.clone()).unwrap_or(false);
				messages.push(PreviewMessage::Rebind { uri: document.clone() });
			}
			if rebound {
				messages.push(font_state_message(parsed.font.as_ref()));
			} else if fresh {
				messages.extend(parsed.font.as_ref().map(|font| font_state_message(Some(font))));
			} else if let Some(message) = &font_message {
				messages.push(message.clone());
			}

			for message in messages {
				if let Err(err) = consumer.send(message) {
					trace!(error = %err, "preview message dropped");
					break;
				}
			}
		}
		interested
	}

	/// Registers a preview and brings it up to the current state of its
	/// document.
	///
	/// A cached parse with markup is sent as is. When the cache only holds a
	/// summary-only parse, or a parse is still in flight, the latest submitted
	/// text is parsed again with markup and propagated.
	pub async fn open_preview(&self, binding: PreviewBinding, sender: PreviewSender) -> PreviewId {
		let dynamic = binding.is_dynamic();
		let document = binding.document().clone();
		let id = self.previews.write().register(binding, sender);
		self.telemetry.command(if dynamic { "livepreview" } else { "livepreviewstatic" });

		let (snapshot, source) = {
			let store = self.store.lock();
			let snapshot = if store.is_rendered(&document) { store.parsed(&document) } else { None };
			(snapshot, store.source(&document))
		};
		match (snapshot, source) {
			(Some(parsed), _) => self.send_snapshot(id, &parsed),
			(None, Some(source)) => {
				debug!(preview = %id, document = %document, "no rendered parse cached, parsing again");
				self.on_document_changed(&document, &source.text, &source.config).await;
			}
			(None, None) => trace!(preview = %id, document = %document, "nothing parsed yet"),
		}
		id
	}

	fn send_snapshot(&self, id: PreviewId, parsed: &ParsedDocument) {
		let mut previews = self.previews.write();
		let Some(consumer) = previews.get_mut(id) else {
			return;
		};
		consumer.take_snapshot_pending();
		let mut messages = content_messages(parsed);
		messages.extend(parsed.font.as_ref().map(|font| font_state_message(Some(font))));
		for message in messages {
			if let Err(err) = consumer.send(message) {
				trace!(error = %err, "preview message dropped");
				break;
			}
		}
	}

	/// Unregisters a preview. Returns `false` for unknown ids.
	pub fn close_preview(&self, id: PreviewId) -> bool {
		let removed = self.previews.write().remove(id).is_some();
		if removed {
			self.refresh_status();
		}
		removed
	}

	pub fn set_preview_focus(&self, id: PreviewId, focused: bool) -> bool {
		let known = self.previews.write().set_focus(id, focused);
		if known {
			self.refresh_status();
		}
		known
	}

	/// Records the editor focus.
	///
	/// When the focused editor moves to a screenplay document the pipeline
	/// has text for, that document is reparsed, which also rebinds dynamic
	/// previews to it. Returns the outcome of that reparse.
	pub async fn set_editor_focus(&self, focus: EditorFocus) -> Option<ReparseOutcome> {
		let activated = focus.active.as_ref().filter(|view| view.is_screenplay()).map(|view| view.document.clone());
		let previous = std::mem::replace(&mut *self.focus.write(), focus);
		let previous = previous.active.map(|view| view.document);

		let reparse = activated
			.filter(|document| previous.as_ref() != Some(document))
			.and_then(|document| self.store.lock().source(&document).map(|source| (document, source)));
		let Some((document, source)) = reparse else {
			self.refresh_status();
			return None;
		};

		debug!(document = %document, "editor focus moved, reparsing");
		let outcome = self.on_document_changed(&document, &source.text, &source.config).await;
		if !outcome.is_applied() {
			self.refresh_status();
		}
		Some(outcome)
	}

	/// Drops all state for `document` and clears its published diagnostics.
	///
	/// Parses still in flight for it are discarded when they complete.
	pub fn on_document_closed(&self, document: &DocumentId) {
		let was_open = self.store.lock().close(document);
		if was_open {
			self.collaborators.diagnostics.set_diagnostics(document, Vec::new());
		}
		self.refresh_status();
	}

	/// A preview could not load the font `document` declares.
	///
	/// Returns `false` when the document declares no font.
	pub fn on_font_unavailable(&self, document: &DocumentId) -> bool {
		let diagnostics = self.store.lock().font_unavailable(document);
		match diagnostics {
			Some(diagnostics) => {
				self.collaborators.diagnostics.set_diagnostics(document, diagnostics);
				true
			}
			None => false,
		}
	}

	/// Document commands act on; see [`resolve_active_document`].
	pub fn active_document(&self) -> Option<DocumentId> {
		resolve_active_document(&self.previews.read(), &self.focus.read())
	}

	/// Most recent successful parse of `document`.
	pub fn parsed(&self, document: &DocumentId) -> Option<Arc<ParsedDocument>> {
		self.store.lock().parsed(document)
	}

	pub fn font(&self, document: &DocumentId) -> Option<FontDeclaration> {
		self.store.lock().font(document).cloned()
	}

	pub fn diagnostics(&self, document: &DocumentId) -> Vec<lsp_types::Diagnostic> {
		self.store.lock().diagnostics(document)
	}

	/// Shows the running time of the active document, or hides the status
	/// item when there is none or it has not been parsed yet.
	fn refresh_status(&self) {
		let parsed = self.active_document().and_then(|document| self.parsed(&document));
		match parsed {
			Some(parsed) => {
				let (text, tooltip) = status_text(&parsed.lengths);
				self.collaborators.status.show_status(&text, &tooltip);
			}
			None => self.collaborators.status.hide_status(),
		}
	}
}

fn prune_closed(previews: &mut PreviewRegistry) {
	for closed in previews.prune_closed() {
		trace!(preview = %closed, "pruned closed preview");
	}
}

fn content_messages(parsed: &ParsedDocument) -> Vec<PreviewMessage> {
	vec![
		PreviewMessage::UpdateTitle {
			content: parsed.title_page.html.clone(),
		},
		PreviewMessage::UpdateScript {
			content: parsed.script_html.clone(),
		},
	]
}

fn transition_message(transition: &FontTransition) -> Option<PreviewMessage> {
	match transition {
		FontTransition::Declared(font) => Some(PreviewMessage::UpdateFont {
			content: font.name.clone(),
		}),
		FontTransition::Removed { .. } => Some(PreviewMessage::RemoveFont),
		FontTransition::Unchanged => None,
	}
}

fn font_state_message(font: Option<&FontDeclaration>) -> PreviewMessage {
	match font {
		Some(font) => PreviewMessage::UpdateFont {
			content: font.name.clone(),
		},
		None => PreviewMessage::RemoveFont,
	}
}
