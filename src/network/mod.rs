// src/network/mod.rs
pub mod feedback;
pub mod registry;
pub mod transport;

pub use feedback::{Ack, CommandError, DispatchError, FeedbackCommand, FeedbackDispatcher, SignalKind};
pub use registry::{DeviceAddressEntry, DeviceRegistry};
pub use transport::{FeedbackTransport, HttpFeedbackTransport};
