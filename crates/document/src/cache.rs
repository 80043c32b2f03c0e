//! Most recent parse per document.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::id::DocumentId;
use crate::parsed::ParsedDocument;

/// Keyed store of the latest [`ParsedDocument`] per [`DocumentId`].
///
/// Entries are swapped as whole `Arc`s, so a reader holding a previous value
/// keeps seeing that value and never a partially updated one. Closing a
/// document must call [`ParseCache::remove`]; nothing expires on its own.
#[derive(Debug, Default)]
pub struct ParseCache {
	entries: HashMap<DocumentId, Arc<ParsedDocument>>,
}

impl ParseCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, document: &DocumentId) -> Option<Arc<ParsedDocument>> {
		self.entries.get(document).cloned()
	}

	/// Replaces any existing entry, returning it.
	pub fn put(&mut self, document: DocumentId, parsed: Arc<ParsedDocument>) -> Option<Arc<ParsedDocument>> {
		trace!(document = %document, scenes = parsed.scenes.len(), "parse cache put");
		self.entries.insert(document, parsed)
	}

	pub fn remove(&mut self, document: &DocumentId) -> Option<Arc<ParsedDocument>> {
		self.entries.remove(document)
	}

	pub fn contains(&self, document: &DocumentId) -> bool {
		self.entries.contains_key(document)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Identities with a cached parse, in no particular order.
	pub fn documents(&self) -> impl Iterator<Item = &DocumentId> {
		self.entries.keys()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parsed::SceneEntry;

	fn doc(name: &str) -> DocumentId {
		DocumentId::parse(&format!("file:///{name}.fountain")).unwrap()
	}

	fn parsed_with_scenes(count: usize) -> Arc<ParsedDocument> {
		let scenes = (0..count)
			.map(|i| SceneEntry {
				number: (i + 1).to_string(),
				line: i as u32 * 4,
				name: format!("INT. ROOM {i} - DAY"),
			})
			.collect();
		Arc::new(ParsedDocument {
			scenes,
			..ParsedDocument::default()
		})
	}

	#[test]
	fn put_replaces_instead_of_merging() {
		let mut cache = ParseCache::new();
		let a = doc("a");

		assert!(cache.put(a.clone(), parsed_with_scenes(3)).is_none());
		let previous = cache.put(a.clone(), parsed_with_scenes(1)).unwrap();

		assert_eq!(previous.scenes.len(), 3);
		assert_eq!(cache.get(&a).unwrap().scenes.len(), 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn reader_keeps_snapshot_across_replacement() {
		let mut cache = ParseCache::new();
		let a = doc("a");
		cache.put(a.clone(), parsed_with_scenes(2));

		let snapshot = cache.get(&a).unwrap();
		cache.put(a.clone(), parsed_with_scenes(5));

		assert_eq!(snapshot.scenes.len(), 2);
		assert_eq!(cache.get(&a).unwrap().scenes.len(), 5);
	}

	#[test]
	fn remove_on_close() {
		let mut cache = ParseCache::new();
		let a = doc("a");
		let b = doc("b");
		cache.put(a.clone(), parsed_with_scenes(1));
		cache.put(b.clone(), parsed_with_scenes(1));

		assert!(cache.remove(&a).is_some());
		assert!(cache.get(&a).is_none());
		assert!(cache.contains(&b));
		assert_eq!(cache.documents().collect::<Vec<_>>(), vec![&b]);
	}
}
