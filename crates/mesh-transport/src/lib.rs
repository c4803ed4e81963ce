//! Reliable large-payload transport: fragmentation, ACK/LOST exchange, and
//! RTT-adaptive retransmission timing over the two in-flight sequence tables
//! (`Q_WSP` outbound, `Q_WRP` inbound) described in spec §4.3.

pub mod error;
pub mod manager;
pub mod priority;
pub mod rtt;
pub mod sequence;
pub mod timeout;

pub use error::TransportError;
pub use manager::{TimeoutSweep, TransportManager};
pub use sequence::{InboundSequence, OutboundSequence};
