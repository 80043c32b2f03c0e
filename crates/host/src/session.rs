//! One stdio session: applies host events to the pipeline and collects the
//! resulting output lines.

use std::sync::Arc;

use slugline_parser::FountainParser;
use slugline_preview::{PreviewBinding, PreviewId, PreviewReceiver, preview_channel};
use slugline_sync::{
	Collaborators, ExportOptions, ExportOutcome, ExportSurface, ScreenplaySync, SluglineConfig, Telemetry, parenthetical_skip,
};
use tracing::{debug, trace};

use crate::outbox::Outbox;
use crate::prompt::HostPrompts;
use crate::protocol::{HostEvent, HostOutput};

pub struct Session {
	sync: Arc<ScreenplaySync>,
	outbox: Arc<Outbox>,
	prompts: Arc<HostPrompts>,
	previews: Vec<(PreviewId, PreviewReceiver)>,
	config: SluglineConfig,
}

impl Session {
	pub fn new(config: SluglineConfig) -> Self {
		let outbox = Arc::new(Outbox::default());
		let collaborators = Collaborators {
			outline: outbox.clone(),
			diagnostics: outbox.clone(),
			status: outbox.clone(),
			editor: outbox.clone(),
		};
		let telemetry = Telemetry::new(outbox.clone(), &config.telemetry);
		Self {
			sync: Arc::new(ScreenplaySync::new(Arc::new(FountainParser), collaborators, telemetry)),
			prompts: Arc::new(HostPrompts::new(outbox.clone())),
			outbox,
			previews: Vec::new(),
			config,
		}
	}

	/// Queue woken by outputs that arrive outside [`Session::handle`].
	pub(crate) fn outbox(&self) -> Arc<Outbox> {
		self.outbox.clone()
	}

	/// Applies one event and returns everything it produced, preview messages
	/// first.
	pub async fn handle(&mut self, event: HostEvent) -> Vec<HostOutput> {
		trace!(?event, "host event");
		let mut leading = Vec::new();
		match event {
			HostEvent::Open { uri, text } | HostEvent::Change { uri, text } => {
				self.outbox.texts.lock().insert(uri.clone(), text.clone());
				self.sync.on_document_changed(&uri, &text, &self.config.parser).await;
			}
			HostEvent::Close { uri } => {
				self.outbox.texts.lock().remove(&uri);
				self.sync.on_document_closed(&uri);
			}
			HostEvent::Focus(focus) => {
				self.sync.set_editor_focus(focus).await;
			}
			HostEvent::OpenPreview { uri, dynamic } => {
				let binding = if dynamic {
					PreviewBinding::Dynamic { current: uri.clone() }
				} else {
					PreviewBinding::Pinned { document: uri.clone() }
				};
				let (tx, rx) = preview_channel();
				let id = self.sync.open_preview(binding, tx).await;
				self.previews.push((id, rx));
				leading.push(HostOutput::PreviewOpened { preview: id.0, uri });
			}
			HostEvent::ClosePreview { preview } => {
				let id = PreviewId(preview);
				if !self.sync.close_preview(id) {
					self.outbox.push(unknown_preview(id));
				}
				self.previews.retain(|(open, _)| *open != id);
			}
			HostEvent::PreviewFocus { preview, focused } => {
				let id = PreviewId(preview);
				if !self.sync.set_preview_focus(id, focused) {
					self.outbox.push(unknown_preview(id));
				}
			}
			HostEvent::JumpTo { line } => {
				if let Err(err) = self.sync.jump_to_line(line, &self.config) {
					debug!(error = %err, "jump failed");
					self.outbox.push(HostOutput::Error { message: err.to_string() });
				}
			}
			HostEvent::FontUnavailable { uri } => {
				self.sync.on_font_unavailable(&uri);
			}
			HostEvent::Newline { line_text, caret } => {
				let column = if self.config.preview.parenthetical_newline_helper {
					parenthetical_skip(&line_text, caret)
				} else {
					None
				};
				self.outbox.push(HostOutput::Caret { column });
			}
			HostEvent::ExportPdf {
				highlight_characters,
				show_save_dialog,
			} => self.spawn_export(ExportOptions {
				show_save_dialog,
				highlight_characters,
			}),
			HostEvent::Answer { request, value } => {
				if !self.prompts.answer(request, value) {
					self.outbox.push(HostOutput::Error {
						message: format!("no prompt waiting on request {request}"),
					});
				}
			}
		}

		let mut outputs = leading;
		outputs.extend(self.flush());
		outputs
	}

	/// Everything produced since the last call, preview messages first.
	pub fn flush(&mut self) -> Vec<HostOutput> {
		let mut outputs = self.drain_previews();
		outputs.extend(self.outbox.take());
		outputs
	}

	/// Runs the export in the background; it suspends on prompts until the
	/// matching `answer` events arrive.
	fn spawn_export(&self, options: ExportOptions) {
		let sync = self.sync.clone();
		let outbox = self.outbox.clone();
		let config = self.config.clone();
		let surface = ExportSurface {
			picker: self.prompts.clone(),
			save_dialog: self.prompts.clone(),
			exporter: self.prompts.clone(),
		};
		tokio::spawn(async move {
			let output = match sync.export_pdf(&surface, options, &config).await {
				Ok(ExportOutcome::Exported(path)) => HostOutput::Exported { path },
				Ok(ExportOutcome::Cancelled) => HostOutput::ExportCancelled,
				Err(err) => {
					debug!(error = %err, "export failed");
					HostOutput::Error { message: err.to_string() }
				}
			};
			outbox.push(output);
		});
	}

	fn drain_previews(&mut self) -> Vec<HostOutput> {
		let mut outputs = Vec::new();
		for (id, rx) in &mut self.previews {
			while let Ok(message) = rx.try_recv() {
				outputs.push(HostOutput::Preview { preview: id.0, message });
			}
		}
		outputs
	}
}

fn unknown_preview(id: PreviewId) -> HostOutput {
	HostOutput::Error {
		message: format!("unknown {id}"),
	}
}
