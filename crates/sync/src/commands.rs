//! Editor commands acting on the active document.

use std::sync::LazyLock;

use regex::Regex;
use slugline_document::{DocumentId, LineNumber};
use slugline_preview::PreviewMessage;
use tracing::{debug, trace};

use crate::config::SluglineConfig;
use crate::error::CommandError;
use crate::pipeline::ScreenplaySync;

static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\(.*\)$").expect("valid parenthetical regex"));

static CUE_WITH_EXTENSION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*(?:[A-Z0-9 ]+|@.*)(?:\([A-Za-z0-9 '\-.()]+\))+$").expect("valid cue regex"));

impl ScreenplaySync {
	/// Reveals `line` of the active document and scrolls its previews along.
	pub fn jump_to_line(&self, line: LineNumber, config: &SluglineConfig) -> Result<DocumentId, CommandError> {
		let document = self.active_document().ok_or(CommandError::NoActiveDocument)?;
		self.telemetry.command("jumpto");

		if !self.collaborators.editor.reveal_line(&document, line) {
			return Err(CommandError::EditorUnavailable(document));
		}

		if config.preview.synchronized_markup_and_preview {
			let previews = self.previews.read();
			for id in previews.bound_to(&document) {
				if let Err(err) = previews.send(id, PreviewMessage::ScrollTo { content: line }) {
					trace!(error = %err, "scroll dropped");
				}
			}
		}
		debug!(document = %document, line, "jumped to line");
		Ok(document)
	}
}

/// Caret column to move to when Enter is typed in `line_text` at `caret`.
///
/// With the caret just before the closing character of a parenthetical, or of
/// a character cue carrying an extension, the caret skips to the end of the
/// line so the newline lands after the `)`.
pub fn parenthetical_skip(line_text: &str, caret: usize) -> Option<usize> {
	let len = line_text.chars().count();
	if len == 0 || caret + 1 != len {
		return None;
	}
	(PARENTHETICAL.is_match(line_text) || CUE_WITH_EXTENSION.is_match(line_text)).then_some(len)
}
