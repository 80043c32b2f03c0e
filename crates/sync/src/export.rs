//! PDF export of the active document.
//!
//! Rendering the PDF itself is left to a [`PdfExporter`]; this module
//! resolves the document, asks the user which characters to highlight and
//! where to save, and derives the default file name.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use slugline_document::{ParsedDocument, ParserConfig, RenderMode};
use tracing::{debug, info};

use crate::config::SluglineConfig;
use crate::error::CommandError;
use crate::pipeline::ScreenplaySync;

/// Highlighted names listed in the file name before collapsing to `+n`.
pub const MAX_NAMED_CHARACTERS: usize = 3;

static SOURCE_EXTENSION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\.(?:(?:better)?fountain|spmd|txt)$").expect("valid extension regex"));

/// Modal multi-select over the character index.
#[async_trait]
pub trait CharacterPicker: Send + Sync {
	/// `None` when the user dismissed the picker.
	async fn pick_characters(&self, characters: Vec<String>) -> Option<Vec<String>>;
}

#[async_trait]
pub trait SaveDialog: Send + Sync {
	/// `None` when the user cancelled.
	async fn choose_path(&self, suggested: PathBuf) -> Option<PathBuf>;
}

#[async_trait]
pub trait PdfExporter: Send + Sync {
	async fn export(&self, path: &Path, parsed: &ParsedDocument, options: &PdfOptions<'_>) -> Result<(), ExportError>;
}

/// Renderer failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ExportError(pub String);

/// Settings handed to the renderer.
#[derive(Debug)]
pub struct PdfOptions<'a> {
	pub parser: &'a ParserConfig,
	pub highlighted_characters: &'a [String],
}

/// UI surfaces the export command suspends on.
#[derive(Clone)]
pub struct ExportSurface {
	pub picker: Arc<dyn CharacterPicker>,
	pub save_dialog: Arc<dyn SaveDialog>,
	pub exporter: Arc<dyn PdfExporter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
	pub show_save_dialog: bool,
	pub highlight_characters: bool,
}

impl Default for ExportOptions {
	fn default() -> Self {
		Self {
			show_save_dialog: true,
			highlight_characters: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
	Exported(PathBuf),
	Cancelled,
}

/// Default PDF path for `source` next to it.
///
/// `screenplay.fountain` with `[ANNA, BOB LEE, CARL, DORA]` highlighted
/// becomes `screenplay(ANNA,BOBLEE,CARL,+1).pdf`.
pub fn pdf_file_name(source: &Path, highlighted: &[String]) -> PathBuf {
	let file_name = source.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
	let mut name = SOURCE_EXTENSION.replace(&file_name, "").into_owned();

	if !highlighted.is_empty() {
		let mut parts: Vec<String> = highlighted
			.iter()
			.take(MAX_NAMED_CHARACTERS)
			.map(|character| character.replace(' ', ""))
			.collect();
		if highlighted.len() > MAX_NAMED_CHARACTERS {
			parts.push(format!("+{}", highlighted.len() - MAX_NAMED_CHARACTERS));
		}
		name.push('(');
		name.push_str(&parts.join(","));
		name.push(')');
	}
	name.push_str(".pdf");
	source.with_file_name(name)
}

impl ScreenplaySync {
	/// Exports the active document to PDF.
	pub async fn export_pdf(
		&self,
		surface: &ExportSurface,
		options: ExportOptions,
		config: &SluglineConfig,
	) -> Result<ExportOutcome, CommandError> {
		let document = self.active_document().ok_or(CommandError::NoActiveDocument)?;
		self.telemetry.command("exportpdf");

		let text = self
			.collaborators
			.editor
			.document_text(&document)
			.ok_or_else(|| CommandError::EditorUnavailable(document.clone()))?;
		let source = document.to_file_path().ok_or_else(|| CommandError::NotAFile(document.clone()))?;

		let parsed = self.parser().parse(&text, &config.parser, RenderMode::Full).await?;

		let mut highlighted = Vec::new();
		if options.highlight_characters {
			match surface.picker.pick_characters(parsed.character_names()).await {
				Some(picked) => highlighted = picked,
				None => {
					debug!(document = %document, "export cancelled in character picker");
					return Ok(ExportOutcome::Cancelled);
				}
			}
		}

		let suggested = pdf_file_name(&source, &highlighted);
		let path = if options.show_save_dialog {
			match surface.save_dialog.choose_path(suggested).await {
				Some(path) => path,
				None => {
					debug!(document = %document, "export cancelled in save dialog");
					return Ok(ExportOutcome::Cancelled);
				}
			}
		} else {
			suggested
		};

		let pdf_options = PdfOptions {
			parser: &config.parser,
			highlighted_characters: &highlighted,
		};
		surface
			.exporter
			.export(&path, &parsed, &pdf_options)
			.await
			.map_err(|err| CommandError::Export {
				path: path.clone(),
				reason: err.to_string(),
			})?;

		info!(document = %document, path = %path.display(), "exported pdf");
		Ok(ExportOutcome::Exported(path))
	}
}

#[cfg(test)]
mod tests {
	use parking_lot::Mutex;
	use pretty_assertions::assert_eq;
	use slugline_document::DocumentId;

	use super::*;
	use crate::focus::{EditorFocus, EditorView, SCREENPLAY_LANGUAGE};
	use crate::test_helpers::Harness;

	fn names(names: &[&str]) -> Vec<String> {
		names.iter().map(|name| (*name).to_owned()).collect()
	}

	#[test]
	fn file_name_collapses_extra_characters() {
		let path = pdf_file_name(Path::new("/work/screenplay.fountain"), &names(&["ANNA", "BOB LEE", "CARL", "DORA"]));
		assert_eq!(path, PathBuf::from("/work/screenplay(ANNA,BOBLEE,CARL,+1).pdf"));
	}

	#[test]
	fn file_name_strips_known_extensions_only() {
		assert_eq!(pdf_file_name(Path::new("a.betterfountain"), &[]), PathBuf::from("a.pdf"));
		assert_eq!(pdf_file_name(Path::new("a.spmd"), &[]), PathBuf::from("a.pdf"));
		assert_eq!(pdf_file_name(Path::new("a.txt"), &names(&["JO"])), PathBuf::from("a(JO).pdf"));
		assert_eq!(pdf_file_name(Path::new("a.md"), &[]), PathBuf::from("a.md.pdf"));
	}

	struct Picker(Option<Vec<String>>);

	#[async_trait]
	impl CharacterPicker for Picker {
		async fn pick_characters(&self, _characters: Vec<String>) -> Option<Vec<String>> {
			self.0.clone()
		}
	}

	struct Dialog(Option<PathBuf>);

	#[async_trait]
	impl SaveDialog for Dialog {
		async fn choose_path(&self, suggested: PathBuf) -> Option<PathBuf> {
			self.0.clone().or(Some(suggested))
		}
	}

	struct Cancel;

	#[async_trait]
	impl SaveDialog for Cancel {
		async fn choose_path(&self, _suggested: PathBuf) -> Option<PathBuf> {
			None
		}
	}

	/// Records each export and the script markup it was handed.
	#[derive(Default)]
	struct Exporter(Mutex<Vec<(PathBuf, Vec<String>)>>, Mutex<Vec<String>>);

	#[async_trait]
	impl PdfExporter for Exporter {
		async fn export(&self, path: &Path, parsed: &ParsedDocument, options: &PdfOptions<'_>) -> Result<(), ExportError> {
			self.0.lock().push((path.to_path_buf(), options.highlighted_characters.to_vec()));
			self.1.lock().push(parsed.script_html.clone());
			Ok(())
		}
	}

	const TEXT: &str = "INT. HALL - DAY\n\nANNA\nHi.\n\nBOB LEE\nHey.\n";

	async fn focused_harness() -> (Harness, DocumentId) {
		let harness = Harness::new();
		let document = DocumentId::parse("file:///work/screenplay.fountain").unwrap();
		harness.recorder.set_text(&document, TEXT);
		harness.sync.set_editor_focus(EditorFocus {
			active: Some(EditorView::new(document.clone(), SCREENPLAY_LANGUAGE)),
			visible: vec![],
		})
		.await;
		(harness, document)
	}

	#[tokio::test]
	async fn exports_with_highlighted_characters() {
		let (harness, _document) = focused_harness().await;
		let exporter = Arc::new(Exporter::default());
		let surface = ExportSurface {
			picker: Arc::new(Picker(Some(names(&["ANNA"])))),
			save_dialog: Arc::new(Dialog(None)),
			exporter: exporter.clone(),
		};
		let options = ExportOptions {
			show_save_dialog: true,
			highlight_characters: true,
		};

		let outcome = harness.sync.export_pdf(&surface, options, &SluglineConfig::default()).await.unwrap();

		let expected = PathBuf::from("/work/screenplay(ANNA).pdf");
		assert_eq!(outcome, ExportOutcome::Exported(expected.clone()));
		assert_eq!(*exporter.0.lock(), vec![(expected, names(&["ANNA"]))]);
		let scripts = exporter.1.lock();
		assert!(scripts[0].contains("INT. HALL - DAY"));
		assert!(scripts[0].contains("BOB LEE"));
		assert!(harness.telemetry.events().contains(&"command:exportpdf".to_owned()));
	}

	#[tokio::test]
	async fn cancelling_a_modal_exports_nothing() {
		let (harness, _document) = focused_harness().await;
		let exporter = Arc::new(Exporter::default());
		let config = SluglineConfig::default();

		let dismissed_picker = ExportSurface {
			picker: Arc::new(Picker(None)),
			save_dialog: Arc::new(Dialog(None)),
			exporter: exporter.clone(),
		};
		let options = ExportOptions {
			show_save_dialog: true,
			highlight_characters: true,
		};
		assert_eq!(
			harness.sync.export_pdf(&dismissed_picker, options, &config).await.unwrap(),
			ExportOutcome::Cancelled
		);

		let dismissed_dialog = ExportSurface {
			picker: Arc::new(Picker(None)),
			save_dialog: Arc::new(Cancel),
			exporter: exporter.clone(),
		};
		assert_eq!(
			harness.sync.export_pdf(&dismissed_dialog, ExportOptions::default(), &config).await.unwrap(),
			ExportOutcome::Cancelled
		);
		assert!(exporter.0.lock().is_empty());
	}

	#[tokio::test]
	async fn no_active_document() {
		let harness = Harness::new();
		let surface = ExportSurface {
			picker: Arc::new(Picker(None)),
			save_dialog: Arc::new(Cancel),
			exporter: Arc::new(Exporter::default()),
		};

		let err = harness
			.sync
			.export_pdf(&surface, ExportOptions::default(), &SluglineConfig::default())
			.await
			.unwrap_err();
		assert!(matches!(err, CommandError::NoActiveDocument));
	}
}
