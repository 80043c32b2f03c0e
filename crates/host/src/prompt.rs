//! Export surfaces answered by the editor over the wire.
//!
//! Each prompt goes out as an output carrying a request number; the editor
//! replies with an `answer` event for that number. A `null` answer cancels.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use slugline_document::ParsedDocument;
use slugline_sync::{CharacterPicker, ExportError, PdfExporter, PdfOptions, SaveDialog};
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::outbox::Outbox;
use crate::protocol::HostOutput;

pub(crate) struct HostPrompts {
	outbox: Arc<Outbox>,
	pending: Mutex<HashMap<u64, oneshot::Sender<Value>>>,
	next_request: AtomicU64,
}

impl HostPrompts {
	pub(crate) fn new(outbox: Arc<Outbox>) -> Self {
		Self {
			outbox,
			pending: Mutex::new(HashMap::new()),
			next_request: AtomicU64::new(0),
		}
	}

	/// Resumes the prompt waiting on `request`. `false` when none is.
	pub(crate) fn answer(&self, request: u64, value: Value) -> bool {
		let waiting = self.pending.lock().remove(&request);
		match waiting {
			Some(tx) => tx.send(value).is_ok(),
			None => false,
		}
	}

	async fn ask(&self, prompt: impl FnOnce(u64) -> HostOutput + Send) -> Value {
		let request = self.next_request.fetch_add(1, Ordering::Relaxed) + 1;
		let (tx, rx) = oneshot::channel();
		self.pending.lock().insert(request, tx);
		self.outbox.push(prompt(request));
		trace!(request, "waiting for prompt answer");
		rx.await.unwrap_or(Value::Null)
	}
}

#[async_trait]
impl CharacterPicker for HostPrompts {
	async fn pick_characters(&self, characters: Vec<String>) -> Option<Vec<String>> {
		let answer = self.ask(|request| HostOutput::PickCharacters { request, characters }).await;
		serde_json::from_value::<Option<Vec<String>>>(answer)
			.map_err(|err| debug!(error = %err, "unreadable character answer"))
			.ok()
			.flatten()
	}
}

#[async_trait]
impl SaveDialog for HostPrompts {
	async fn choose_path(&self, suggested: PathBuf) -> Option<PathBuf> {
		let answer = self.ask(|request| HostOutput::ChooseSavePath { request, suggested }).await;
		serde_json::from_value::<Option<PathBuf>>(answer)
			.map_err(|err| debug!(error = %err, "unreadable save path answer"))
			.ok()
			.flatten()
	}
}

/// Hands the rendered markup to the editor, which prints it to `path`.
#[async_trait]
impl PdfExporter for HostPrompts {
	async fn export(&self, path: &Path, parsed: &ParsedDocument, options: &PdfOptions<'_>) -> Result<(), ExportError> {
		self.outbox.push(HostOutput::RenderPdf {
			path: path.to_path_buf(),
			title: parsed.title_page.html.clone(),
			script: parsed.script_html.clone(),
			highlighted: options.highlighted_characters.to_vec(),
		});
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[tokio::test]
	async fn answers_resume_the_matching_prompt() {
		let outbox = Arc::new(Outbox::default());
		let prompts = Arc::new(HostPrompts::new(outbox.clone()));

		let picking = tokio::spawn({
			let prompts = prompts.clone();
			async move { prompts.pick_characters(vec!["ANNA".into(), "BOB".into()]).await }
		});
		outbox.ready().await;
		assert_eq!(
			outbox.take(),
			vec![HostOutput::PickCharacters {
				request: 1,
				characters: vec!["ANNA".into(), "BOB".into()],
			}]
		);

		assert!(!prompts.answer(2, json!(["ANNA"])));
		assert!(prompts.answer(1, json!(["BOB"])));
		assert_eq!(picking.await.unwrap(), Some(vec!["BOB".to_owned()]));
		assert!(!prompts.answer(1, json!(["BOB"])));
	}

	#[tokio::test]
	async fn null_or_garbage_cancels() {
		let outbox = Arc::new(Outbox::default());
		let prompts = Arc::new(HostPrompts::new(outbox.clone()));

		let saving = tokio::spawn({
			let prompts = prompts.clone();
			async move { prompts.choose_path(PathBuf::from("/work/a.pdf")).await }
		});
		outbox.ready().await;
		outbox.take();
		assert!(prompts.answer(1, Value::Null));
		assert_eq!(saving.await.unwrap(), None);

		let picking = tokio::spawn({
			let prompts = prompts.clone();
			async move { prompts.pick_characters(vec!["ANNA".into()]).await }
		});
		outbox.ready().await;
		assert!(prompts.answer(2, json!(42)));
		assert_eq!(picking.await.unwrap(), None);
	}
}
