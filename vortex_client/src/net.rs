use crate::protocol::{ClientRequest, OutboundMsg, SocketEvent};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::protocol::Message;

/// One WebSocket connection attempt, run on its own thread. The thread
/// owns the socket; the rest of the client only sees `SocketEvent`s and
/// the outbound request queue. A fresh thread is spawned per connect
/// attempt and the old one is discarded, never reused.
pub struct NetworkThread {
    shutdown: Arc<AtomicBool>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkThread {
    pub fn spawn(addr: &str, event_tx: Sender<SocketEvent>, out_rx: Receiver<OutboundMsg>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_for_thread = Arc::clone(&shutdown);
        let addr = addr.to_string();

        let join_handle =
            thread::spawn(move || run_client(&addr, event_tx, out_rx, shutdown_for_thread));

        Self {
            shutdown,
            join_handle: Mutex::new(Some(join_handle)),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Ok(mut h) = self.join_handle.lock() {
            if let Some(h) = h.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for NetworkThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_client(
    addr: &str,
    event_tx: Sender<SocketEvent>,
    out_rx: Receiver<OutboundMsg>,
    shutdown: Arc<AtomicBool>,
) {
    let stream = match TcpStream::connect(addr) {
        Ok(s) => s,
        Err(e) => {
            let _ = event_tx.try_send(SocketEvent::Errored(format!("tcp connect failed: {e}")));
            return;
        }
    };
    let _ = stream.set_nodelay(true);
    let _ = stream.set_read_timeout(Some(Duration::from_millis(30)));
    let _ = stream.set_write_timeout(Some(Duration::from_millis(200)));

    let mut ws = match tungstenite::client(format!("ws://{addr}"), stream) {
        Ok((ws, _)) => ws,
        Err(e) => {
            let _ = event_tx.try_send(SocketEvent::Errored(format!("ws handshake failed: {e}")));
            return;
        }
    };

    let _ = event_tx.try_send(SocketEvent::Connected);

    while !shutdown.load(Ordering::Relaxed) {
        // Outbound: drain queued requests.
        loop {
            match out_rx.try_recv() {
                Ok(OutboundMsg::Send { req }) => {
                    if send_request(&mut ws, &req).is_err() {
                        let _ = ws.close(None);
                        let _ = event_tx.try_send(SocketEvent::Errored(
                            "ws send failed".to_string(),
                        ));
                        return;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    let _ = ws.close(None);
                    return;
                }
            }
        }

        // Inbound: read at most one message per loop (timeouts keep the loop moving).
        match ws.read() {
            Ok(Message::Text(s)) => {
                let _ = event_tx.try_send(SocketEvent::Frame(s));
            }
            Ok(Message::Ping(payload)) => {
                let _ = ws.send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => {
                let _ = event_tx.try_send(SocketEvent::Closed);
                return;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(tungstenite::Error::ConnectionClosed) => {
                let _ = event_tx.try_send(SocketEvent::Closed);
                return;
            }
            Err(e) => {
                let _ = event_tx.try_send(SocketEvent::Errored(format!("ws read failed: {e}")));
                return;
            }
        }
    }

    let _ = ws.close(None);
}

fn send_request(ws: &mut tungstenite::WebSocket<TcpStream>, req: &ClientRequest) -> Result<(), ()> {
    let payload = serde_json::to_string(req).map_err(|_| ())?;
    ws.send(Message::Text(payload)).map_err(|_| ())
}
