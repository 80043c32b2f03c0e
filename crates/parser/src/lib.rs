//! Reference Fountain parser.
//!
//! Recognises a practical subset of Fountain: the title page, scene headings
//! (with optional `#n#` numbers), character cues, parentheticals, dialogue,
//! notes and action. Everything the sync pipeline consumes (scene index,
//! character index, lengths, font declaration) is derived here; HTML is only
//! produced for [`RenderMode::Full`].

mod classify;
mod html;
mod timing;
mod title;

use async_trait::async_trait;
use slugline_document::{
	CharacterIndex, FontDeclaration, Lengths, LineNumber, ParseError, ParsedDocument, ParserConfig, RenderMode, SceneEntry, ScreenplayParser,
	TitlePage, count_lines,
};
use tracing::trace;

use crate::classify::ElementKind;

/// Title-page key declaring a custom preview font.
pub const FONT_KEY: &str = "font";

/// In-process parser; completes without suspending.
#[derive(Debug, Clone, Copy, Default)]
pub struct FountainParser;

#[async_trait]
impl ScreenplayParser for FountainParser {
	async fn parse(&self, text: &str, config: &ParserConfig, render: RenderMode) -> Result<ParsedDocument, ParseError> {
		parse_text(text, config, render)
	}
}

/// Parses `text` synchronously.
pub fn parse_text(text: &str, config: &ParserConfig, render: RenderMode) -> Result<ParsedDocument, ParseError> {
	let lines: Vec<&str> = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)).collect();
	if let Some(index) = lines.iter().position(|line| line.contains('\0')) {
		return Err(ParseError::Malformed {
			line: index as LineNumber,
			reason: "unexpected NUL byte".into(),
		});
	}

	let (fields, body_start) = title::parse_title_page(&lines);
	let font = fields
		.iter()
		.find(|field| field.key == FONT_KEY && !field.value.trim().is_empty())
		.map(|field| FontDeclaration {
			name: field.value.trim().to_owned(),
			line: field.line,
		});

	let elements = classify::classify(&lines[body_start..], body_start);

	let mut scenes = Vec::new();
	let mut characters = CharacterIndex::new();
	let mut lengths = Lengths::default();
	let mut script = html::ScriptHtml::new(config, render);
	let mut next_scene = 1u32;

	for element in &elements {
		match &element.kind {
			ElementKind::Scene { heading, number } => {
				let number = number.map(str::to_owned).unwrap_or_else(|| next_scene.to_string());
				next_scene += 1;
				script.scene(element.line, heading, &number);
				scenes.push(SceneEntry {
					number,
					line: element.line,
					name: (*heading).to_owned(),
				});
			}
			ElementKind::Character { name, cue } => {
				characters.entry(name.clone()).or_default().push(element.line);
				script.paragraph("character", element.line, cue);
			}
			ElementKind::Parenthetical(text) => script.paragraph("parenthetical", element.line, text),
			ElementKind::Dialogue(text) => {
				lengths.dialogue += timing::dialogue_seconds(text);
				script.paragraph("dialogue", element.line, text);
			}
			ElementKind::Action(text) => {
				lengths.action += timing::action_seconds(text);
				script.paragraph("action", element.line, text);
			}
			ElementKind::Note(text) => {
				if config.print_notes {
					script.paragraph("note", element.line, text);
				}
			}
		}
	}

	let title_html = if render.renders() && config.print_title_page {
		html::title_page(&fields)
	} else {
		String::new()
	};

	let parsed = ParsedDocument {
		title_page: TitlePage { fields, html: title_html },
		script_html: script.finish(),
		scenes,
		characters,
		lengths,
		font,
		line_count: count_lines(text),
		first_token_line: elements.first().map(|element| element.line),
	};
	trace!(
		lines = parsed.line_count,
		scenes = parsed.scenes.len(),
		characters = parsed.characters.len(),
		render = ?render,
		"parsed screenplay"
	);
	Ok(parsed)
}
