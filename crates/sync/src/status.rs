//! Status bar text for the running-time estimate.

use slugline_document::Lengths;

/// `HH:MM:SS`, rounded down to whole seconds. Negative input counts as zero.
pub fn format_duration(seconds: f64) -> String {
	let total = if seconds.is_finite() && seconds > 0.0 { seconds as u64 } else { 0 };
	format!("{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

/// Status bar text and tooltip for `lengths`.
pub fn status_text(lengths: &Lengths) -> (String, String) {
	let text = format_duration(lengths.total());
	let tooltip = format!(
		"Dialogue: {}\nAction: {}",
		format_duration(lengths.dialogue),
		format_duration(lengths.action)
	);
	(text, tooltip)
}
