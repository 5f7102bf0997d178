pub const INBOUND_CAP: usize = 256;
pub const OUTBOUND_CAP: usize = 256;

/// Events the network thread reports to the main loop.
#[derive(Debug)]
pub enum SocketEvent {
    Connected,
    Frame(String),
    Closed,
    Errored(String),
}

pub enum OutboundMsg {
    Send { req: ClientRequest },
}

pub use vlines_protocol::{
    ClientRequest, DataInfoPayload, DatasetConfig, FrameHeader, ServerMessage, VortexLineRecord,
};
