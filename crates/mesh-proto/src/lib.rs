//! Binary packet header/payload codec for the mesh routing engine.
//!
//! Wire structures are byte-packed, little-endian, with a fixed 7-byte base
//! header and type-dependent sub-headers (spec §6.1). This is a hand-rolled
//! codec rather than a schema-driven serializer: the layout is byte-exact and
//! externally fixed, so every offset is computed explicitly from the type
//! octet's bit field instead of being derived from a struct's field order.

pub mod constants;
pub mod error;
pub mod factory;
pub mod header;
pub mod network_node;
pub mod packet;
pub mod role;

pub use constants::{type_bits, BROADCAST};
pub use error::PacketError;
pub use header::{ControlSub, DataSub, Header};
pub use network_node::NetworkNode;
pub use packet::{classify, max_user_payload, validate_max_packet_size, AppPacket, Packet, PacketKind, PacketView};
pub use role::Role;
