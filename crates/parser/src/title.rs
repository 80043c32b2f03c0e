use std::sync::LazyLock;

use regex::Regex;
use slugline_document::{LineNumber, TitleField};

static TITLE_KEY: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9 _-]*):[ \t]*(.*)$").expect("title key pattern is valid"));

/// Parses the leading `Key: value` block.
///
/// Returns the fields and the index of the first body line. Without a key on
/// the first line there is no title page and the body starts at 0.
pub(crate) fn parse_title_page(lines: &[&str]) -> (Vec<TitleField>, usize) {
	match lines.first() {
		Some(first) if TITLE_KEY.is_match(first) => {}
		_ => return (Vec::new(), 0),
	}

	let mut fields: Vec<TitleField> = Vec::new();
	let mut index = 0;
	while let Some(raw) = lines.get(index) {
		if raw.trim().is_empty() {
			break;
		}

		let indented = raw.starts_with(char::is_whitespace);
		match TITLE_KEY.captures(raw).filter(|_| !indented) {
			Some(caps) => fields.push(TitleField {
				key: caps[1].trim().to_lowercase(),
				value: caps[2].trim().to_owned(),
				line: index as LineNumber,
			}),
			None => {
				if let Some(field) = fields.last_mut() {
					if !field.value.is_empty() {
						field.value.push('\n');
					}
					field.value.push_str(raw.trim());
				}
			}
		}
		index += 1;
	}

	(fields, index)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn fields_with_continuations() {
		let lines = ["Title: BRICK & STEEL", "Credit: Written by", "Author:", "    Stu Maschwitz", "    Alex Hahn", "", "INT. ROOM"];
		let (fields, body) = parse_title_page(&lines);

		assert_eq!(body, 5);
		assert_eq!(
			fields,
			vec![
				TitleField {
					key: "title".into(),
					value: "BRICK & STEEL".into(),
					line: 0,
				},
				TitleField {
					key: "credit".into(),
					value: "Written by".into(),
					line: 1,
				},
				TitleField {
					key: "author".into(),
					value: "Stu Maschwitz\nAlex Hahn".into(),
					line: 2,
				},
			]
		);
	}

	#[test]
	fn no_title_page_without_leading_key() {
		let lines = ["INT. ROOM - DAY", "", "Font: Courier"];
		assert_eq!(parse_title_page(&lines), (Vec::new(), 0));
	}
}
