use crate::constants::{self, type_bits};
use crate::error::PacketError;
use crate::header::{ControlSub, DataSub, Header};

/// Which broad family a type octet falls into; used to dispatch received
/// packets without re-deriving the bit predicates at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Hello,
    Data,
    NeedAck,
    XlData,
    Ack,
    Lost,
    Sync,
}

/// Classifies a type octet into a [`PacketKind`]. Multiple control bits can be
/// set at once on the wire; this picks the most specific interpretation in the
/// same priority order the spec enumerates them.
pub fn classify(kind: u8) -> Result<PacketKind, PacketError> {
    if type_bits::is_hello(kind) {
        return Ok(PacketKind::Hello);
    }
    if !type_bits::is_data(kind) {
        return Err(PacketError::UnknownType(kind));
    }
    if type_bits::is_sync(kind) {
        Ok(PacketKind::Sync)
    } else if type_bits::is_lost(kind) {
        Ok(PacketKind::Lost)
    } else if type_bits::is_ack(kind) {
        Ok(PacketKind::Ack)
    } else if type_bits::is_xl(kind) {
        Ok(PacketKind::XlData)
    } else if type_bits::is_need_ack(kind) {
        Ok(PacketKind::NeedAck)
    } else {
        Ok(PacketKind::Data)
    }
}

/// A zero-copy view over a raw received frame: parses the header and
/// sub-headers on demand, and exposes the payload as a borrowed slice rather
/// than cloning it. Used on the receive hot path before a packet is decided
/// worth retaining as an owned [`Packet`].
#[derive(Debug, Clone, Copy)]
pub struct PacketView<'a> {
    bytes: &'a [u8],
}

impl<'a> PacketView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn header(&self) -> Result<Header, PacketError> {
        Header::decode(self.bytes)
    }

    pub fn data_sub(&self) -> Result<Option<DataSub>, PacketError> {
        let header = self.header()?;
        if !type_bits::is_data(header.kind) {
            return Ok(None);
        }
        DataSub::decode(&self.bytes[constants::BASE_HEADER_SIZE..]).map(Some)
    }

    pub fn control_sub(&self) -> Result<Option<ControlSub>, PacketError> {
        let header = self.header()?;
        if !type_bits::is_control(header.kind) {
            return Ok(None);
        }
        let offset = constants::BASE_HEADER_SIZE
            + if type_bits::is_data(header.kind) {
                constants::DATA_SUB_HEADER_SIZE
            } else {
                0
            };
        ControlSub::decode(&self.bytes[offset..]).map(Some)
    }

    pub fn payload(&self) -> Result<&'a [u8], PacketError> {
        let header = self.header()?;
        let offset = constants::BASE_HEADER_SIZE + type_bits::extra_before_payload(header.kind);
        let end = offset + header.payload_size as usize;
        if self.bytes.len() < end {
            return Err(PacketError::TooShort(self.bytes.len(), end));
        }
        Ok(&self.bytes[offset..end])
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// An owned packet: header, optional sub-headers, and payload. Moves between
/// queues by ownership; cloning produces a distinct allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub data_sub: Option<DataSub>,
    pub control_sub: Option<ControlSub>,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Builds a packet, silently truncating the payload to fit
    /// `max_packet_size` (spec §4.1: "exceeding silently truncates with a
    /// warning"). Callers that want a hard error should check the payload
    /// length against [`max_user_payload`] themselves.
    pub fn new(
        dst: u16,
        src: u16,
        kind: u8,
        id: u8,
        via: Option<u16>,
        control: Option<ControlSub>,
        mut payload: Vec<u8>,
        max_packet_size: usize,
    ) -> Self {
        let budget = max_user_payload(kind, max_packet_size);
        if payload.len() > budget {
            tracing::warn!(
                kind,
                requested = payload.len(),
                budget,
                "truncating oversized packet payload"
            );
            payload.truncate(budget);
        }
        let data_sub = if type_bits::is_data(kind) {
            Some(DataSub {
                via: via.unwrap_or(0),
            })
        } else {
            None
        };
        let control_sub = if type_bits::is_control(kind) {
            control
        } else {
            None
        };
        Self {
            header: Header {
                dst,
                src,
                kind,
                id,
                payload_size: payload.len() as u8,
            },
            data_sub,
            control_sub,
            payload,
        }
    }

    pub fn kind(&self) -> u8 {
        self.header.kind
    }

    pub fn via(&self) -> Option<u16> {
        self.data_sub.map(|d| d.via)
    }

    pub fn total_size(&self) -> usize {
        constants::BASE_HEADER_SIZE
            + type_bits::extra_before_payload(self.header.kind)
            + self.payload.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.total_size());
        self.header.encode(&mut buf);
        if let Some(data_sub) = &self.data_sub {
            data_sub.encode(&mut buf);
        }
        if let Some(control_sub) = &self.control_sub {
            control_sub.encode(&mut buf);
        }
        buf.extend_from_slice(&self.payload);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        let view = PacketView::new(bytes);
        let header = view.header()?;
        let data_sub = view.data_sub()?;
        let control_sub = view.control_sub()?;
        let payload = view.payload()?.to_vec();
        Ok(Self {
            header,
            data_sub,
            control_sub,
            payload,
        })
    }
}

/// Presentation-layer struct handed to the application on receive: owns its
/// buffer, with every control sub-header already stripped away (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPacket {
    pub dst: u16,
    pub src: u16,
    pub payload: Vec<u8>,
}

/// Maximum bytes of user payload a packet of this type can carry under
/// `max_packet_size` (spec §4.1).
pub fn max_user_payload(kind: u8, max_packet_size: usize) -> usize {
    max_packet_size.saturating_sub(type_bits::header_size(kind))
}

pub fn validate_max_packet_size(max_packet_size: usize) -> Result<(), PacketError> {
    if !(constants::MIN_MAX_PACKET_SIZE..=constants::MAX_MAX_PACKET_SIZE)
        .contains(&max_packet_size)
    {
        return Err(PacketError::InvalidMaxPacketSize(
            max_packet_size,
            constants::MIN_MAX_PACKET_SIZE,
            constants::MAX_MAX_PACKET_SIZE,
        ));
    }
    Ok(())
}
