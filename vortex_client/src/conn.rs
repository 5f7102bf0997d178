use crate::error::ClientError;
use crate::net::NetworkThread;
use crate::protocol::{ClientRequest, OutboundMsg, SocketEvent, INBOUND_CAP, OUTBOUND_CAP};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Open,
    Closed,
    Errored,
}

/// Owns the one socket the client is allowed to have. Requests issued
/// while the connection is not open are queued and flushed in order
/// once the connection reaches `Open`; close and error transitions are
/// logged but never trigger an automatic reconnect.
pub struct ConnectionManager {
    addr: String,
    state: ConnState,
    net: Option<NetworkThread>,
    event_rx: Option<Receiver<SocketEvent>>,
    out_tx: Option<Sender<OutboundMsg>>,
    pending: VecDeque<ClientRequest>,
    ready_pending: bool,
    last_error: Option<ClientError>,
}

impl ConnectionManager {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            state: ConnState::Disconnected,
            net: None,
            event_rx: None,
            out_tx: None,
            pending: VecDeque::new(),
            ready_pending: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Most recent transport failure, if any. Cleared on the next
    /// successful connect.
    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Spawns a fresh network thread. No-op while a connect is already
    /// in flight or the connection is open.
    pub fn connect(&mut self) {
        if matches!(self.state, ConnState::Connecting | ConnState::Open) {
            return;
        }

        let (event_tx, event_rx) = bounded(INBOUND_CAP);
        let (out_tx, out_rx) = bounded(OUTBOUND_CAP);

        // Dropping the previous thread joins it; the old socket is
        // discarded, never reused.
        self.net = Some(NetworkThread::spawn(&self.addr, event_tx, out_rx));
        self.event_rx = Some(event_rx);
        self.out_tx = Some(out_tx);
        self.state = ConnState::Connecting;
        debug!(addr = %self.addr, "connecting");
    }

    /// Drops the socket and returns to `Disconnected`. Queued requests
    /// are kept for the next connect.
    pub fn disconnect(&mut self) {
        if let Some(net) = self.net.take() {
            net.shutdown();
        }
        self.event_rx = None;
        self.out_tx = None;
        self.ready_pending = false;
        self.state = ConnState::Disconnected;
    }

    /// Transmits immediately when open; otherwise queues the request
    /// and triggers a connect. The queue is flushed when `Open` is
    /// observed in `poll`.
    pub fn send(&mut self, req: ClientRequest) {
        if self.state == ConnState::Open {
            self.transmit(req);
        } else {
            self.pending.push_back(req);
            self.connect();
        }
    }

    /// Drains socket events, applying state transitions. Inbound text
    /// frames are returned for the caller to dispatch.
    pub fn poll(&mut self) -> Vec<String> {
        let mut drained = Vec::new();
        if let Some(rx) = &self.event_rx {
            loop {
                match rx.try_recv() {
                    Ok(ev) => drained.push(ev),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
        }

        let mut frames = Vec::new();
        for ev in drained {
            match ev {
                SocketEvent::Connected => {
                    self.state = ConnState::Open;
                    self.ready_pending = true;
                    self.last_error = None;
                    info!(addr = %self.addr, "connected to server");
                    self.flush_pending();
                }
                SocketEvent::Frame(text) => frames.push(text),
                SocketEvent::Closed => {
                    self.state = ConnState::Closed;
                    info!("connection closed");
                }
                SocketEvent::Errored(msg) => {
                    self.state = ConnState::Errored;
                    warn!(error = %msg, "connection error");
                    self.last_error = Some(ClientError::Connection(msg));
                }
            }
        }
        frames
    }

    /// True exactly once per successful connect, right after `poll`
    /// observed the `Connected` event.
    pub fn take_ready(&mut self) -> bool {
        std::mem::take(&mut self.ready_pending)
    }

    fn flush_pending(&mut self) {
        while let Some(req) = self.pending.pop_front() {
            self.transmit(req);
        }
    }

    fn transmit(&mut self, req: ClientRequest) {
        let Some(tx) = &self.out_tx else { return };
        if tx.try_send(OutboundMsg::Send { req }).is_err() {
            warn!("outbound queue full, request dropped");
        }
    }
}
