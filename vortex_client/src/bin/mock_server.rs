//! Single-client mock data server: serves a canned vortex-line dataset
//! over WebSocket so the client can be exercised without a real
//! simulation backend.

use std::fs;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tungstenite::protocol::Message;
use vlines_protocol::{
    ClientRequest, DataInfoPayload, DatasetConfig, FrameHeader, ServerMessage, VortexLineRecord,
};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const FRAME_COUNT: usize = 8;
const LINES_PER_FRAME: i64 = 3;

fn demo_data_info() -> ServerMessage {
    ServerMessage::DataInfo {
        data: DataInfoPayload {
            cfg: DatasetConfig {
                dt: 0.01,
                extra: Default::default(),
            },
            hdrs: (0..FRAME_COUNT)
                .map(|i| FrameHeader {
                    timestep: 5 * i as i64,
                    bx: 1.0,
                    by: 0.0,
                    bz: 0.0,
                    v: 2.0,
                })
                .collect(),
            inclusions: serde_json::json!([]),
        },
    }
}

/// Deterministic helix bundle; the frame index only shifts the phase so
/// stepping frames visibly moves the lines.
fn demo_vlines(frame: usize) -> ServerMessage {
    let data = (0..LINES_PER_FRAME)
        .map(|k| {
            let radius = 10.0 + 3.0 * k as f32;
            let mut verts = Vec::with_capacity(16 * 3);
            for j in 0..16 {
                let s = j as f32 * 0.4 + frame as f32 * 0.1;
                verts.push(radius * s.cos());
                verts.push(radius * s.sin());
                verts.push(2.0 * j as f32 - 15.0);
            }
            VortexLineRecord {
                gid: 100 + k,
                r: 255,
                g: (60 * k) as u8,
                b: (90 * k) as u8,
                verts,
            }
        })
        .collect();
    ServerMessage::Vlines { data }
}

fn handle_request(ws: &mut tungstenite::WebSocket<TcpStream>, text: &str) -> Result<(), ()> {
    let req: ClientRequest = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "ignoring unparseable request");
            return Ok(());
        }
    };

    let reply = match &req {
        ClientRequest::RequestDataInfo { dbname } => {
            info!(dbname = %dbname, "serving data info");
            demo_data_info()
        }
        ClientRequest::RequestFrame { dbname, frame } => {
            info!(dbname = %dbname, frame, "serving frame");
            demo_vlines(*frame)
        }
    };

    let payload = serde_json::to_string(&reply).map_err(|_| ())?;
    ws.send(Message::Text(payload)).map_err(|_| ())
}

fn serve_client(mut ws: tungstenite::WebSocket<TcpStream>, deadline: Option<Instant>) {
    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                let _ = ws.close(None);
                return;
            }
        }
        match ws.read() {
            Ok(Message::Text(s)) => {
                if handle_request(&mut ws, &s).is_err() {
                    let _ = ws.close(None);
                    return;
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = ws.send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) | Err(tungstenite::Error::ConnectionClosed) => {
                info!("client disconnected");
                return;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                warn!(error = %e, "ws read failed");
                return;
            }
        }
    }
}

fn parse_arg_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let addr = parse_arg_value(&args, "--addr")
        .or_else(|| std::env::var("VLINES_WS_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let addr_file = parse_arg_value(&args, "--addr-file").map(PathBuf::from);
    let run_for_ms = parse_arg_value(&args, "--run-for-ms")
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis);

    let listener = match TcpListener::bind(&addr) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("ws bind failed on {addr}: {e}");
            std::process::exit(1);
        }
    };
    let listen_addr = listener.local_addr().expect("listener has a local addr");
    if let Some(path) = &addr_file {
        let _ = fs::write(path, listen_addr.to_string());
    }
    println!("mock_server listening on ws://{listen_addr}");

    let deadline = run_for_ms.map(|d| Instant::now() + d);
    let _ = listener.set_nonblocking(true);

    // Single-client policy: serve one connection at a time.
    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return;
            }
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                let _ = stream.set_nodelay(true);
                let _ = stream.set_read_timeout(Some(Duration::from_millis(30)));
                let _ = stream.set_write_timeout(Some(Duration::from_millis(200)));
                match tungstenite::accept(stream) {
                    Ok(ws) => {
                        info!(peer = %peer, "client connected");
                        serve_client(ws, deadline);
                    }
                    Err(e) => warn!(error = %e, "ws handshake failed"),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(e) => {
                warn!(error = %e, "ws accept failed");
                std::thread::sleep(Duration::from_millis(25));
            }
        }
    }
}
