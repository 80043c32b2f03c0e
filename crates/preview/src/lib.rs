//! Live preview consumers.
//!
//! A preview is a UI surface bound to one document at a time. The sync
//! pipeline pushes typed [`PreviewMessage`]s into each consumer's channel; the
//! [`PreviewRegistry`] keeps consumers in registration order so fan-out is
//! deterministic.

mod consumer;
mod message;
mod registry;

pub use consumer::{
	ConsumerUnavailable, PreviewBinding, PreviewConsumer, PreviewId, PreviewReceiver, PreviewSender, RebindError, preview_channel,
};
pub use message::PreviewMessage;
pub use registry::PreviewRegistry;
