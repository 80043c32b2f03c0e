//! Screen-time estimates.

/// Spoken time per syllable.
const SECONDS_PER_SYLLABLE: f64 = 0.3;

/// Reading speed for action lines.
const ACTION_CHARS_PER_SECOND: f64 = 20.0;

pub(crate) fn dialogue_seconds(text: &str) -> f64 {
	syllables(text) as f64 * SECONDS_PER_SYLLABLE
}

pub(crate) fn action_seconds(text: &str) -> f64 {
	text.chars().count() as f64 / ACTION_CHARS_PER_SECOND
}

/// Vowel groups per word, at least one for every word containing a letter.
fn syllables(text: &str) -> usize {
	text.split_whitespace()
		.map(|word| {
			let mut groups = 0;
			let mut in_vowel = false;
			for ch in word.chars().flat_map(char::to_lowercase) {
				let vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
				if vowel && !in_vowel {
					groups += 1;
				}
				in_vowel = vowel;
			}
			if groups == 0 && word.chars().any(char::is_alphabetic) { 1 } else { groups }
		})
		.sum()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_vowel_groups() {
		assert_eq!(syllables("Hello."), 2);
		assert_eq!(syllables("Brr, shh!"), 2);
		assert_eq!(syllables("quietly away"), 4);
		assert_eq!(syllables("  "), 0);
	}

	#[test]
	fn action_reads_at_fixed_rate() {
		assert_eq!(action_seconds(&"x".repeat(40)), 2.0);
	}
}
