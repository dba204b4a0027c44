pub mod client;
pub mod signature;
pub mod webhook;

pub use client::{LineClient, ReplyClient};
pub use signature::{sign, verify_signature};
pub use webhook::{EventMessage, EventSource, InboundMessage, WebhookEvent, WebhookPayload};
