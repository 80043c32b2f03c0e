//! Parser seam.
//!
//! The pipeline only knows the [`ScreenplayParser`] trait. Parsing may be
//! synchronous work behind an `async fn` or a real round trip to another
//! process; callers must not assume either.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::parsed::{LineNumber, ParsedDocument};

/// Whether rendered output is needed.
///
/// [`RenderMode::SummaryOnly`] is an optimization switch: the parser may skip
/// producing HTML, but every other field must match a full parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
	Full,
	SummaryOnly,
}

impl RenderMode {
	/// Full rendering only when some preview will display the result.
	pub fn for_consumers(has_consumers: bool) -> Self {
		if has_consumers { Self::Full } else { Self::SummaryOnly }
	}

	pub fn renders(self) -> bool {
		matches!(self, Self::Full)
	}
}

/// Placement of scene numbers in rendered headings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneNumbers {
	None,
	#[default]
	Left,
	Right,
	Both,
}

/// Options forwarded to the parser on every parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
	/// Render the title page fragment.
	pub print_title_page: bool,
	/// Render `[[notes]]` into the script body.
	pub print_notes: bool,
	pub scene_numbers: SceneNumbers,
}

impl Default for ParserConfig {
	fn default() -> Self {
		Self {
			print_title_page: true,
			print_notes: false,
			scene_numbers: SceneNumbers::default(),
		}
	}
}

/// Parser failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	/// The text cannot be interpreted as a screenplay.
	#[error("malformed screenplay at line {line}: {reason}")]
	Malformed { line: LineNumber, reason: String },
	/// The parser could not run at all.
	#[error("parser unavailable: {0}")]
	Unavailable(String),
}

impl ParseError {
	/// Line to anchor a diagnostic at, when known.
	pub fn line(&self) -> Option<LineNumber> {
		match self {
			Self::Malformed { line, .. } => Some(*line),
			Self::Unavailable(_) => None,
		}
	}
}

/// Screenplay parser.
#[async_trait]
pub trait ScreenplayParser: Send + Sync {
	/// Parses the full text of one document.
	async fn parse(&self, text: &str, config: &ParserConfig, render: RenderMode) -> Result<ParsedDocument, ParseError>;
}
