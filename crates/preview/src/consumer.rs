use std::fmt;

use slugline_document::DocumentId;
use tokio::sync::mpsc;

use crate::message::PreviewMessage;

/// Sender half of a preview's message channel.
pub type PreviewSender = mpsc::UnboundedSender<PreviewMessage>;

/// Receiver half of a preview's message channel.
pub type PreviewReceiver = mpsc::UnboundedReceiver<PreviewMessage>;

/// Creates the channel a preview surface reads its messages from.
pub fn preview_channel() -> (PreviewSender, PreviewReceiver) {
	mpsc::unbounded_channel()
}

/// Registry-assigned preview identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(pub u64);

impl fmt::Display for PreviewId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "preview#{}", self.0)
	}
}

/// Which document a preview shows and whether that may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBinding {
	/// Follows the document that was last reparsed.
	Dynamic { current: DocumentId },
	/// Always shows one document.
	Pinned { document: DocumentId },
}

impl PreviewBinding {
	pub fn document(&self) -> &DocumentId {
		match self {
			Self::Dynamic { current } => current,
			Self::Pinned { document } => document,
		}
	}

	pub fn is_dynamic(&self) -> bool {
		matches!(self, Self::Dynamic { .. })
	}
}

/// Rebinding a pinned preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{preview} is pinned to {document}")]
pub struct RebindError {
	pub preview: PreviewId,
	pub document: DocumentId,
}

/// The preview stopped receiving messages (its receiver was dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is no longer receiving messages")]
pub struct ConsumerUnavailable(pub PreviewId);

/// One live preview surface.
#[derive(Debug)]
pub struct PreviewConsumer {
	id: PreviewId,
	binding: PreviewBinding,
	focused: bool,
	/// Nothing delivered yet; the first delivery carries the full font state.
	awaiting_snapshot: bool,
	sender: PreviewSender,
}

impl PreviewConsumer {
	pub(crate) fn new(id: PreviewId, binding: PreviewBinding, sender: PreviewSender) -> Self {
		Self {
			id,
			binding,
			focused: false,
			awaiting_snapshot: true,
			sender,
		}
	}

	pub fn id(&self) -> PreviewId {
		self.id
	}

	pub fn binding(&self) -> &PreviewBinding {
		&self.binding
	}

	pub fn document(&self) -> &DocumentId {
		self.binding.document()
	}

	pub fn is_focused(&self) -> bool {
		self.focused
	}

	pub(crate) fn set_focused(&mut self, focused: bool) {
		self.focused = focused;
	}

	/// Clears the first-delivery flag, returning whether it was set.
	pub fn take_snapshot_pending(&mut self) -> bool {
		std::mem::replace(&mut self.awaiting_snapshot, false)
	}

	/// Open while the surface still holds its receiver.
	pub fn is_live(&self) -> bool {
		!self.sender.is_closed()
	}

	/// Points a dynamic preview at `document`.
	///
	/// Returns whether the binding actually changed. Pinned previews never
	/// rebind.
	pub fn rebind(&mut self, document: DocumentId) -> Result<bool, RebindError> {
		match &mut self.binding {
			PreviewBinding::Dynamic { current } => {
				if *current == document {
					return Ok(false);
				}
				*current = document;
				Ok(true)
			}
			PreviewBinding::Pinned { document: pinned } => Err(RebindError {
				preview: self.id,
				document: pinned.clone(),
			}),
		}
	}

	pub fn send(&self, message: PreviewMessage) -> Result<(), ConsumerUnavailable> {
		self.sender.send(message).map_err(|_| ConsumerUnavailable(self.id))
	}
}
