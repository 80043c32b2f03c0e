//! Screenplay document model shared by the parser, previews and the sync pipeline.
//!
//! - [`DocumentId`]: canonical URI key for one editable document.
//! - [`ParsedDocument`]: immutable result of one parse, replaced wholesale on reparse.
//! - [`ScreenplayParser`]: the parser seam; implementations live outside this crate.
//! - [`ParseCache`]: most recent parse per document.
//! - [`FontTracker`]: edge-triggered detection of custom font declarations.

pub mod cache;
pub mod font;
pub mod id;
pub mod parsed;
pub mod parser;

pub use cache::ParseCache;
pub use font::{FontTracker, FontTransition};
pub use id::{DocumentId, DocumentIdError};
pub use parsed::{
	CharacterIndex, DocumentSummary, FontDeclaration, Lengths, LineNumber, ParsedDocument, SceneEntry, TitleField, TitlePage, count_lines,
};
pub use parser::{ParseError, ParserConfig, RenderMode, SceneNumbers, ScreenplayParser};
