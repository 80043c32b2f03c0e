//! Line classification for the script body.

use std::sync::LazyLock;

use regex::Regex;
use slugline_document::LineNumber;

static SCENE_PREFIX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)^(?:int\.?/ext|int/ext|i/e|int|ext|est)[. ]").expect("scene prefix pattern is valid"));

static SCENE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*#([^#\s]+)#\s*$").expect("scene number pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ElementKind<'a> {
	Scene { heading: &'a str, number: Option<&'a str> },
	Character { name: String, cue: &'a str },
	Parenthetical(&'a str),
	Dialogue(&'a str),
	Action(&'a str),
	Note(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element<'a> {
	pub line: LineNumber,
	pub kind: ElementKind<'a>,
}

/// Classifies body lines; `offset` is the line number of `lines[0]`.
pub(crate) fn classify<'a>(lines: &[&'a str], offset: usize) -> Vec<Element<'a>> {
	let mut elements = Vec::new();
	let mut in_dialogue = false;

	for (index, raw) in lines.iter().enumerate() {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			in_dialogue = false;
			continue;
		}

		let kind = if in_dialogue {
			if is_parenthetical(trimmed) {
				ElementKind::Parenthetical(trimmed)
			} else {
				ElementKind::Dialogue(trimmed)
			}
		} else if let Some(note) = note_body(trimmed) {
			ElementKind::Note(note)
		} else if let Some((heading, number)) = scene_heading(trimmed) {
			ElementKind::Scene { heading, number }
		} else if let Some(name) = character_cue(trimmed).filter(|_| next_has_text(lines, index)) {
			in_dialogue = true;
			ElementKind::Character { name, cue: trimmed }
		} else {
			ElementKind::Action(trimmed)
		};

		elements.push(Element {
			line: (offset + index) as LineNumber,
			kind,
		});
	}

	elements
}

fn next_has_text(lines: &[&str], index: usize) -> bool {
	lines.get(index + 1).is_some_and(|next| !next.trim().is_empty())
}

pub(crate) fn is_parenthetical(line: &str) -> bool {
	line.len() >= 2 && line.starts_with('(') && line.ends_with(')')
}

fn note_body(line: &str) -> Option<&str> {
	line.strip_prefix("[[")?.strip_suffix("]]").map(str::trim)
}

/// Heading text and explicit scene number of a scene heading line.
pub(crate) fn scene_heading(line: &str) -> Option<(&str, Option<&str>)> {
	let (heading, number) = match SCENE_NUMBER.captures(line) {
		Some(caps) => {
			let whole = caps.get(0)?;
			(&line[..whole.start()], caps.get(1).map(|number| number.as_str()))
		}
		None => (line, None),
	};

	if let Some(forced) = heading.strip_prefix('.') {
		// `...` opens an action line, not a forced heading.
		if forced.is_empty() || forced.starts_with('.') {
			return None;
		}
		return Some((forced.trim(), number));
	}

	SCENE_PREFIX.is_match(heading).then(|| (heading.trim(), number))
}

/// Character name of a cue line, without extensions such as `(V.O.)`.
pub(crate) fn character_cue(line: &str) -> Option<String> {
	if let Some(forced) = line.strip_prefix('@') {
		let name = cue_name(forced);
		return (!name.is_empty()).then(|| name.to_owned());
	}
	// Transitions such as `CUT TO:`.
	if line.ends_with("TO:") {
		return None;
	}

	let name = cue_name(line);
	let has_letter = name.chars().any(char::is_alphabetic);
	let all_upper = !name.chars().any(char::is_lowercase);
	(has_letter && all_upper).then(|| name.to_owned())
}

fn cue_name(cue: &str) -> &str {
	let base = cue.split('(').next().unwrap_or(cue);
	base.trim().trim_end_matches('^').trim_end()
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("INT. ROOM - DAY", Some(("INT. ROOM - DAY", None)))]
	#[case("ext. beach - night", Some(("ext. beach - night", None)))]
	#[case("INT./EXT. CAR - MOVING", Some(("INT./EXT. CAR - MOVING", None)))]
	#[case("I/E TRAIN", Some(("I/E TRAIN", None)))]
	#[case("EST. CITY #12A#", Some(("EST. CITY", Some("12A"))))]
	#[case(".FLASHBACK", Some(("FLASHBACK", None)))]
	#[case("...and then", None)]
	#[case("INTERIOR DESIGN", None)]
	fn scene_headings(#[case] line: &str, #[case] expected: Option<(&str, Option<&str>)>) {
		assert_eq!(scene_heading(line), expected);
	}

	#[rstest]
	#[case("JOHN", Some("JOHN"))]
	#[case("MARY (V.O.)", Some("MARY"))]
	#[case("BOB^", Some("BOB"))]
	#[case("@McCLANE", Some("McCLANE"))]
	#[case("CUT TO:", None)]
	#[case("R2D2", Some("R2D2"))]
	#[case("1975", None)]
	#[case("John walks in.", None)]
	fn character_cues(#[case] line: &str, #[case] expected: Option<&str>) {
		assert_eq!(character_cue(line).as_deref(), expected);
	}

	#[test]
	fn cue_needs_following_text() {
		let lines = ["JOHN", "", "JOHN", "Hello."];
		let kinds: Vec<_> = classify(&lines, 10).into_iter().map(|element| (element.line, element.kind)).collect();

		assert_eq!(
			kinds,
			vec![
				(10, ElementKind::Action("JOHN")),
				(12, ElementKind::Character {
					name: "JOHN".into(),
					cue: "JOHN",
				}),
				(13, ElementKind::Dialogue("Hello.")),
			]
		);
	}

	#[test]
	fn dialogue_block_ends_at_blank_line() {
		let lines = ["JOHN", "(quietly)", "Hello.", "", "He leaves."];
		let kinds: Vec<_> = classify(&lines, 0).into_iter().map(|element| element.kind).collect();

		assert_eq!(kinds[1], ElementKind::Parenthetical("(quietly)"));
		assert_eq!(kinds[2], ElementKind::Dialogue("Hello."));
		assert_eq!(kinds[3], ElementKind::Action("He leaves."));
	}

	#[test]
	fn notes_are_recognised() {
		let lines = ["[[ check continuity ]]"];
		assert_eq!(classify(&lines, 0)[0].kind, ElementKind::Note("check continuity"));
	}
}
