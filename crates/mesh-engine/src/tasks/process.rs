//! Process-received task (spec §4.4.1 continued, priority 3): turns raw
//! frames into routing updates, forwarded packets, control replies, and
//! reassembled application packets.

use std::num::Wrapping;
use std::sync::Arc;
use std::time::Duration;

use mesh_proto::{classify, AppPacket, NetworkNode, Packet, PacketKind};
use mesh_transport::priority;

use crate::engine::{EngineInner, EngineState};
use crate::queues::QueuedPacket;
use crate::tasks::running;

const WAIT_TIMEOUT: Duration = Duration::from_secs(1);

pub(crate) fn run(inner: Arc<EngineInner>) {
    while running(&inner) {
        let frame = {
            let state = inner.state.lock().expect("engine state poisoned");
            let (mut state, _) = inner
                .wake
                .wait_timeout_while(state, WAIT_TIMEOUT, |s| s.raw_received.is_empty() && running(&inner))
                .expect("engine state poisoned");
            state.raw_received.pop()
        };
        let Some(frame) = frame else { continue };

        let packet = match Packet::decode(&frame.bytes) {
            Ok(p) => p,
            Err(err) => {
                tracing::debug!(?err, "dropping malformed frame");
                inner.stats.update(|s| s.receive_errors += Wrapping(1));
                continue;
            }
        };
        let kind = match classify(packet.kind()) {
            Ok(k) => k,
            Err(err) => {
                tracing::debug!(?err, "dropping frame of unknown type");
                inner.stats.update(|s| s.receive_errors += Wrapping(1));
                continue;
            }
        };

        inner.stats.update(|s| {
            s.received_payload_bytes += Wrapping(packet.payload.len() as u32);
            if packet.header.dst == mesh_proto::BROADCAST {
                s.received_broadcast_packets += Wrapping(1);
            }
        });

        let now_ms = inner.platform.monotonic_ms();
        let mut state = inner.state.lock().expect("engine state poisoned");
        match kind {
            PacketKind::Hello => handle_hello(&inner, &mut state, &packet, frame.snr, now_ms),
            _ => handle_data(&inner, &mut state, kind, packet, now_ms),
        }
        drop(state);
        inner.wake.notify_all();
    }
}

fn handle_hello(inner: &EngineInner, state: &mut EngineState, packet: &Packet, snr: i8, now_ms: u64) {
    let nodes = match NetworkNode::decode_all(&packet.payload) {
        Ok(nodes) => nodes,
        Err(err) => {
            tracing::debug!(?err, "malformed hello payload");
            return;
        }
    };
    let processed = state.routing.process_route(
        packet.header.src,
        packet.header.id,
        &nodes,
        snr,
        now_ms,
        inner.config.default_timeout_ms(),
        &mut state.dup_cache,
        &mut state.trigger,
    );
    inner.stats.update(|s| {
        s.received_hello_packets += Wrapping(1);
        if !processed {
            s.duplicates_detected += Wrapping(1);
        }
    });
}

fn handle_data(inner: &EngineInner, state: &mut EngineState, kind: PacketKind, packet: Packet, now_ms: u64) {
    let via = packet.via().unwrap_or(0);
    if via != 0 && via != inner.local_addr && via != mesh_proto::BROADCAST {
        inner.stats.update(|s| s.received_not_for_me += Wrapping(1));
        return;
    }
    inner.stats.update(|s| s.received_i_am_via += Wrapping(1));

    let dst = packet.header.dst;
    let src = packet.header.src;
    let for_me = dst == inner.local_addr || dst == mesh_proto::BROADCAST;

    match kind {
        PacketKind::Data => {
            if for_me {
                state.received_app.push(AppPacket { dst, src, payload: packet.payload });
                inner.stats.update(|s| s.data_packet_for_me += Wrapping(1));
            } else {
                forward_or_drop(inner, state, packet);
            }
        }
        PacketKind::NeedAck => {
            // Single best-effort fragment with an ack request but no tracked
            // sequence (Non-goals: fragmentation limited to one active
            // sequence); treated like plain data once delivered.
            if for_me {
                state.received_app.push(AppPacket { dst, src, payload: packet.payload });
                inner.stats.update(|s| s.data_packet_for_me += Wrapping(1));
            } else {
                forward_or_drop(inner, state, packet);
            }
        }
        PacketKind::Sync | PacketKind::XlData | PacketKind::Ack | PacketKind::Lost => {
            if !for_me {
                forward_or_drop(inner, state, packet);
                return;
            }
            handle_reliable(inner, state, kind, packet, now_ms);
        }
        PacketKind::Hello => unreachable!("handled by caller"),
    }
}

fn forward_or_drop(inner: &EngineInner, state: &mut EngineState, packet: Packet) {
    let next_hop = state.routing.next_hop(packet.header.dst);
    if next_hop == 0 {
        inner.stats.update(|s| s.destiny_unreachable += Wrapping(1));
        tracing::debug!(dst = packet.header.dst, "no route, dropping");
        return;
    }
    let forwarded = mesh_proto::factory::forward(packet, next_hop);
    state.send_queue.push(QueuedPacket::new(priority::DATA_PRIORITY, forwarded));
    inner.stats.update(|s| s.forwarded_packets += Wrapping(1));
}

fn handle_reliable(inner: &EngineInner, state: &mut EngineState, kind: PacketKind, packet: Packet, now_ms: u64) {
    let src = packet.header.src;
    let control = match packet.control_sub {
        Some(c) => c,
        None => {
            tracing::debug!("reliable-transport packet missing control sub-header");
            return;
        }
    };
    let reply_via = state.routing.next_hop(src);
    let max_size = inner.config.max_packet_size;

    match kind {
        PacketKind::Sync => {
            let EngineState { transport, routing, .. } = state;
            let ack = transport.on_sync(src, reply_via, control.seq_id, control.number, inner.local_addr, now_ms, routing, max_size);
            state.send_queue.push(QueuedPacket::new(priority::ACK_PRIORITY, ack));
        }
        PacketKind::XlData => {
            let EngineState { transport, routing, .. } = state;
            let (reply, reassembled) = transport.on_fragment(
                src,
                control.seq_id,
                control.number,
                packet.payload,
                inner.local_addr,
                now_ms,
                routing,
                max_size,
            );
            if let Some(reply) = reply {
                let prio = if mesh_proto::constants::type_bits::is_lost(reply.kind()) {
                    priority::LOST_PRIORITY
                } else {
                    priority::ACK_PRIORITY
                };
                state.send_queue.push(QueuedPacket::new(prio, reply));
            }
            if let Some(payload) = reassembled {
                state.received_app.push(AppPacket { dst: inner.local_addr, src, payload });
                inner.stats.update(|s| s.data_packet_for_me += Wrapping(1));
            }
        }
        PacketKind::Ack => {
            let EngineState { transport, routing, .. } = state;
            if let Some(next) = transport.on_ack(src, control.seq_id, control.number, inner.local_addr, now_ms, routing, max_size) {
                state.send_queue.push(QueuedPacket::new(priority::DATA_PRIORITY, next));
            }
        }
        PacketKind::Lost => {
            if let Some(resend) = state.transport.on_lost(src, control.seq_id, control.number, inner.local_addr, now_ms, max_size) {
                state.send_queue.push(QueuedPacket::new(priority::MAX_PRIORITY, resend));
            }
        }
        PacketKind::Data | PacketKind::NeedAck | PacketKind::Hello => unreachable!("handled by caller"),
    }
}
