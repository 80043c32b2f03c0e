//! HTML fragments for previews.
//!
//! Every element carries `data-line` so a preview can scroll to the element
//! rendered from a given source line.

use slugline_document::{LineNumber, ParserConfig, RenderMode, SceneNumbers, TitleField};

pub(crate) fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for ch in text.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(ch),
		}
	}
	out
}

/// Accumulates the script body; a no-op unless rendering was requested.
pub(crate) struct ScriptHtml {
	out: Option<String>,
	scene_numbers: SceneNumbers,
}

impl ScriptHtml {
	pub(crate) fn new(config: &ParserConfig, render: RenderMode) -> Self {
		Self {
			out: render.renders().then(String::new),
			scene_numbers: config.scene_numbers,
		}
	}

	pub(crate) fn scene(&mut self, line: LineNumber, heading: &str, number: &str) {
		let Some(out) = self.out.as_mut() else {
			return;
		};
		let number = escape(number);
		let (left, right) = match self.scene_numbers {
			SceneNumbers::None => (false, false),
			SceneNumbers::Left => (true, false),
			SceneNumbers::Right => (false, true),
			SceneNumbers::Both => (true, true),
		};

		out.push_str(&format!("<h3 class=\"scene-heading\" data-line=\"{line}\" data-scene=\"{number}\">"));
		if left {
			out.push_str(&format!("<span class=\"scene-number-left\">{number}</span>"));
		}
		out.push_str(&escape(heading));
		if right {
			out.push_str(&format!("<span class=\"scene-number-right\">{number}</span>"));
		}
		out.push_str("</h3>\n");
	}

	pub(crate) fn paragraph(&mut self, class: &str, line: LineNumber, text: &str) {
		if let Some(out) = self.out.as_mut() {
			out.push_str(&format!("<p class=\"{class}\" data-line=\"{line}\">{}</p>\n", escape(text)));
		}
	}

	pub(crate) fn finish(self) -> String {
		self.out.unwrap_or_default()
	}
}

pub(crate) fn title_page(fields: &[TitleField]) -> String {
	if fields.is_empty() {
		return String::new();
	}

	let mut out = String::from("<div class=\"title-page\">\n");
	for field in fields {
		let class: String = field
			.key
			.chars()
			.map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
			.collect();
		let value = escape(&field.value).replace('\n', "<br>");
		out.push_str(&format!("<p class=\"title-{class}\" data-line=\"{}\">{value}</p>\n", field.line));
	}
	out.push_str("</div>\n");
	out
}
