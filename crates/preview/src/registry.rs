use indexmap::IndexMap;
use slugline_document::DocumentId;
use tracing::{debug, trace};

use crate::consumer::{ConsumerUnavailable, PreviewBinding, PreviewConsumer, PreviewId, PreviewSender};
use crate::message::PreviewMessage;

/// Live previews in registration order.
///
/// UI focus is exclusive: focusing one preview clears focus on the others.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
	consumers: IndexMap<PreviewId, PreviewConsumer>,
	next_id: u64,
}

impl PreviewRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new preview and returns its id.
	pub fn register(&mut self, binding: PreviewBinding, sender: PreviewSender) -> PreviewId {
		self.next_id += 1;
		let id = PreviewId(self.next_id);
		debug!(preview = %id, document = %binding.document(), dynamic = binding.is_dynamic(), "preview registered");
		self.consumers.insert(id, PreviewConsumer::new(id, binding, sender));
		id
	}

	/// Removes a preview, keeping the order of the remaining ones.
	pub fn remove(&mut self, id: PreviewId) -> Option<PreviewConsumer> {
		let removed = self.consumers.shift_remove(&id);
		if removed.is_some() {
			debug!(preview = %id, "preview removed");
		}
		removed
	}

	pub fn get(&self, id: PreviewId) -> Option<&PreviewConsumer> {
		self.consumers.get(&id)
	}

	pub fn get_mut(&mut self, id: PreviewId) -> Option<&mut PreviewConsumer> {
		self.consumers.get_mut(&id)
	}

	pub fn len(&self) -> usize {
		self.consumers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.consumers.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &PreviewConsumer> {
		self.consumers.values()
	}

	/// Sets focus on one preview. Returns `false` for unknown ids.
	pub fn set_focus(&mut self, id: PreviewId, focused: bool) -> bool {
		if !self.consumers.contains_key(&id) {
			return false;
		}
		for consumer in self.consumers.values_mut() {
			if consumer.id() == id {
				consumer.set_focused(focused);
			} else if focused {
				consumer.set_focused(false);
			}
		}
		true
	}

	/// The live preview holding UI focus, if any.
	pub fn focused(&self) -> Option<&PreviewConsumer> {
		self.consumers.values().find(|consumer| consumer.is_focused() && consumer.is_live())
	}

	/// Live previews bound to `document`, in registration order.
	pub fn bound_to(&self, document: &DocumentId) -> Vec<PreviewId> {
		self.consumers
			.values()
			.filter(|consumer| consumer.is_live() && consumer.document() == document)
			.map(PreviewConsumer::id)
			.collect()
	}

	/// Live previews that must hear about a reparse of `document`: those bound
	/// to it plus every dynamic preview, in registration order.
	pub fn interested_in(&self, document: &DocumentId) -> Vec<PreviewId> {
		self.consumers
			.values()
			.filter(|consumer| consumer.is_live() && (consumer.binding().is_dynamic() || consumer.document() == document))
			.map(PreviewConsumer::id)
			.collect()
	}

	/// Sends one message; unknown or closed previews are unavailable.
	pub fn send(&self, id: PreviewId, message: PreviewMessage) -> Result<(), ConsumerUnavailable> {
		let consumer = self.consumers.get(&id).ok_or(ConsumerUnavailable(id))?;
		trace!(preview = %id, command = message.kind(), "preview message");
		consumer.send(message)
	}

	/// Drops previews whose surfaces went away and returns their ids.
	pub fn prune_closed(&mut self) -> Vec<PreviewId> {
		let closed: Vec<_> = self
			.consumers
			.values()
			.filter(|consumer| !consumer.is_live())
			.map(PreviewConsumer::id)
			.collect();
		for id in &closed {
			self.remove(*id);
		}
		closed
	}
}
