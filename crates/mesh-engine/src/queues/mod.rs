pub mod bounded;
pub mod send_queue;

pub use bounded::BoundedQueue;
pub use send_queue::{QueuedPacket, SendQueue};
