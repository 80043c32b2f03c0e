//! Parsed screenplay representation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::id::DocumentId;

/// Zero-based line number within a document.
pub type LineNumber = u32;

/// Lines in `text` as the parser numbers them: every `\n` starts a new line,
/// so a trailing newline adds an empty last line.
pub fn count_lines(text: &str) -> u32 {
	text.split('\n').count() as u32
}

/// Character name → ascending lines where the character speaks.
pub type CharacterIndex = BTreeMap<String, Vec<LineNumber>>;

/// One `Key: value` field of the title page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleField {
	/// Lower-cased key (`title`, `author`, `font`, ...).
	pub key: String,
	/// Value with continuation lines joined by `\n`.
	pub value: String,
	/// Line of the key.
	pub line: LineNumber,
}

/// Title-page block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitlePage {
	/// Fields in document order.
	pub fields: Vec<TitleField>,
	/// Rendered fragment; empty when rendering was not requested.
	pub html: String,
}

impl TitlePage {
	/// First field with the given (lower-case) key.
	pub fn get(&self, key: &str) -> Option<&TitleField> {
		self.fields.iter().find(|field| field.key == key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|field| field.key.as_str())
	}
}

/// Entry of the scene index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneEntry {
	/// Scene number, either explicit (`#12A#`) or sequential.
	pub number: String,
	/// Line of the scene heading.
	pub line: LineNumber,
	/// Heading text without the scene number.
	pub name: String,
}

/// Custom font declared on the title page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontDeclaration {
	pub name: String,
	/// Line of the declaration, used to anchor diagnostics.
	pub line: LineNumber,
}

/// Estimated screen time, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Lengths {
	pub action: f64,
	pub dialogue: f64,
}

impl Lengths {
	pub fn total(&self) -> f64 {
		self.action + self.dialogue
	}
}

/// Structured output of parsing one document's text at one point in time.
///
/// Never mutated after construction; the cache shares it behind an `Arc` and
/// replaces the whole value on every reparse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedDocument {
	pub title_page: TitlePage,
	/// Rendered script body; empty when rendering was not requested.
	pub script_html: String,
	pub scenes: Vec<SceneEntry>,
	pub characters: CharacterIndex,
	pub lengths: Lengths,
	pub font: Option<FontDeclaration>,
	/// Number of lines in the source text; see [`count_lines`].
	pub line_count: u32,
	/// First non-blank line after the title page.
	pub first_token_line: Option<LineNumber>,
}

impl ParsedDocument {
	/// Summary handed to outline and status collaborators.
	pub fn summary(&self, document: &DocumentId) -> DocumentSummary {
		DocumentSummary {
			document: document.clone(),
			scenes: self.scenes.clone(),
			characters: self.characters.clone(),
			lengths: self.lengths,
		}
	}

	pub fn character_names(&self) -> Vec<String> {
		self.characters.keys().cloned().collect()
	}
}

/// Scene index, character index and lengths of one parsed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
	pub document: DocumentId,
	pub scenes: Vec<SceneEntry>,
	pub characters: CharacterIndex,
	pub lengths: Lengths,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trailing_newline_starts_a_line() {
		assert_eq!(count_lines(""), 1);
		assert_eq!(count_lines("a"), 1);
		assert_eq!(count_lines("a\n"), 2);
		assert_eq!(count_lines("a\r\nb"), 2);
	}
}
