//! Keeps previews, outline, diagnostics and status in step with screenplay
//! documents as they are edited.
//!
//! # Architecture
//!
//! - [`ScreenplaySync`]: the reparse-and-propagate pipeline and command entry points.
//! - [`DocumentStore`]: owned per-document state (parse cache, font state, diagnostics).
//! - [`resolve_active_document`]: which document commands act on.
//! - [`Telemetry`]: sampled usage reporting.
//! - [`SluglineConfig`]: TOML configuration.

pub mod collab;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod focus;
pub mod pipeline;
pub mod status;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod test_helpers;

pub use collab::{Collaborators, DiagnosticSink, EditorCommands, OutlineView, StatusIndicator};
pub use commands::parenthetical_skip;
pub use config::{ConfigError, PreviewConfig, SluglineConfig, TelemetryConfig};
pub use error::CommandError;
pub use export::{
	CharacterPicker, ExportError, ExportOptions, ExportOutcome, ExportSurface, PdfExporter, PdfOptions, SaveDialog, pdf_file_name,
};
pub use focus::{EditorFocus, EditorView, SCREENPLAY_LANGUAGE, resolve_active_document};
pub use pipeline::{ReparseOutcome, ScreenplaySync};
pub use status::{format_duration, status_text};
pub use store::DocumentStore;
pub use telemetry::{ParseSampler, Telemetry, TelemetryError, TelemetryTransport};
