//! Edge-triggered custom font tracking.
//!
//! Previews only need to hear about a custom font when the declaration
//! appears, disappears or names a different font. Reparses that leave the
//! declaration alone must not produce anything.

use std::collections::HashMap;

use tracing::debug;

use crate::id::DocumentId;
use crate::parsed::{FontDeclaration, LineNumber, ParsedDocument};

/// Result of comparing a new parse with the last seen font state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontTransition {
	/// A font is now declared (previously absent, or a different font name).
	Declared(FontDeclaration),
	/// The previously declared font is gone.
	Removed {
		/// Line the old declaration sat on.
		previous_line: LineNumber,
	},
	Unchanged,
}

impl FontTransition {
	pub fn is_unchanged(&self) -> bool {
		matches!(self, Self::Unchanged)
	}
}

/// Per-document last seen font declaration.
#[derive(Debug, Default)]
pub struct FontTracker {
	declared: HashMap<DocumentId, FontDeclaration>,
}

impl FontTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Compares `parsed` against the stored state for `document` and updates it.
	pub fn detect(&mut self, document: &DocumentId, parsed: &ParsedDocument) -> FontTransition {
		let transition = match (self.declared.get_mut(document), &parsed.font) {
			(None, None) => FontTransition::Unchanged,
			(None, Some(font)) => {
				self.declared.insert(document.clone(), font.clone());
				FontTransition::Declared(font.clone())
			}
			(Some(previous), None) => {
				let previous_line = previous.line;
				self.declared.remove(document);
				FontTransition::Removed { previous_line }
			}
			(Some(previous), Some(font)) if previous.name != font.name => {
				*previous = font.clone();
				FontTransition::Declared(font.clone())
			}
			(Some(previous), Some(font)) => {
				// Same font moved to another line: keep the anchor current.
				previous.line = font.line;
				FontTransition::Unchanged
			}
		};

		if !transition.is_unchanged() {
			debug!(document = %document, transition = ?transition, "font transition");
		}
		transition
	}

	pub fn current(&self, document: &DocumentId) -> Option<&FontDeclaration> {
		self.declared.get(document)
	}

	/// Drops state for a closed document.
	pub fn forget(&mut self, document: &DocumentId) {
		self.declared.remove(document);
	}
}
