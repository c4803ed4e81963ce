use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("cannot open a reliable sequence to the broadcast address")]
    BroadcastDestination,
    #[error("reliable payload must not be empty")]
    EmptyPayload,
    #[error("no route to destination {0:#06x}")]
    DestinationUnreachable(u16),
}
