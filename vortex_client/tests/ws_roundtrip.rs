use glam::Vec3;
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tungstenite::Message;
use vlines_protocol::ClientRequest;
use vortex_client::{CameraView, ConnState, RecordingHost, VortexClient};

const DATA_INFO: &str = r#"{
    "type": "dataInfo",
    "data": {
        "cfg": {"dt": 0.01, "Nx": 64},
        "hdrs": [
            {"timestep": 0, "Bx": 0.0, "By": 0.0, "Bz": 0.0, "V": 0.0},
            {"timestep": 5, "Bx": 1.0, "By": 0.0, "Bz": 0.0, "V": 2.0}
        ],
        "inclusions": []
    }
}"#;

// One malformed record (gid 99) that the client must skip.
const VLINES: &str = r#"{
    "type": "vlines",
    "data": [
        {"gid": 1, "r": 255, "g": 0, "b": 0, "verts": [0, 0, 0, 5, 0, 0, 10, 5, 0]},
        {"gid": 99, "r": 0, "g": 0, "b": 0, "verts": [1, 2, 3, 4]},
        {"gid": 2, "r": 0, "g": 255, "b": 0, "verts": [0, 5, 0, 0, 10, 0]}
    ]
}"#;

fn spawn_mock_server() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_millis(30)));
        let _ = stream.set_write_timeout(Some(Duration::from_millis(200)));
        let mut ws = tungstenite::accept(stream).expect("ws accept");

        // Garbage mid-session must not kill the client or its state.
        ws.send(Message::Text("this is not json".into()))
            .expect("send garbage");

        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            match ws.read() {
                Ok(Message::Text(s)) => {
                    let req: ClientRequest =
                        serde_json::from_str(&s).expect("valid request json");
                    let reply = match req {
                        ClientRequest::RequestDataInfo { .. } => DATA_INFO,
                        ClientRequest::RequestFrame { .. } => VLINES,
                    };
                    ws.send(Message::Text(reply.into())).expect("send reply");
                }
                Ok(Message::Close(_)) | Err(tungstenite::Error::ConnectionClosed) => return,
                Ok(_) => {}
                Err(tungstenite::Error::Io(e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(_) => return,
            }
        }
    });

    (addr, handle)
}

#[test]
fn ws_roundtrip_builds_scene_and_labels() {
    let (addr, server) = spawn_mock_server();

    let mut client = VortexClient::new(addr.to_string(), "demo.db");
    client.set_frame(1);

    // Sending before the connection is open queues the request and
    // kicks off the connect; it must be flushed once the socket opens.
    client.request_current_frame();

    let mut host = RecordingHost::new();
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        client.tick(&mut host);
        if client.scene().len() == 2 && client.store().frame_count() == 2 {
            break;
        }
        if Instant::now() >= deadline {
            panic!(
                "timeout waiting for scene (state={:?}, lines={}, headers={})",
                client.conn_state(),
                client.scene().len(),
                client.store().frame_count()
            );
        }
        thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(client.conn_state(), ConnState::Open);

    // The malformed record is excluded, everything else survives.
    assert_eq!(client.scene().ids, vec![1, 2]);
    assert_eq!(host.tubes.len(), 2);

    let info = client.frame_info().expect("frame header for frame 1");
    assert_eq!(info.timestep, 5);
    assert!((info.t - 0.05).abs() < 1e-9);

    let camera = CameraView::perspective(
        Vec3::new(0.0, 0.0, 200.0),
        Vec3::ZERO,
        30f32.to_radians(),
        1280.0,
        720.0,
        0.1,
        1000.0,
    );
    client.render_tick(&camera, &mut host);
    assert_eq!(host.labels.len(), 2);
    assert_eq!(host.visible_labels(), 2);
    // gid 1's anchor sits at the camera target: dead center.
    assert!((host.labels[&1].pos.x - 640.0).abs() < 0.5);
    assert!((host.labels[&1].pos.y - 360.0).abs() < 0.5);

    drop(client);
    server.join().expect("server thread");
}

#[test]
fn client_observes_server_close() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_millis(30)));
        let mut ws = tungstenite::accept(stream).expect("ws accept");
        let _ = ws.close(None);
        // Drive the close handshake to completion.
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            match ws.read() {
                Err(tungstenite::Error::ConnectionClosed) | Ok(Message::Close(_)) => break,
                Err(tungstenite::Error::Io(e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut => {}
                _ => {}
            }
        }
    });

    let mut client = VortexClient::new(addr.to_string(), "demo.db");
    client.connect();

    let mut host = RecordingHost::new();
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        client.tick(&mut host);
        if matches!(client.conn_state(), ConnState::Closed | ConnState::Errored) {
            break;
        }
        if Instant::now() >= deadline {
            panic!("timeout waiting for close (state={:?})", client.conn_state());
        }
        thread::sleep(Duration::from_millis(10));
    }

    // No reconnect is scheduled; state stays down until asked.
    thread::sleep(Duration::from_millis(50));
    client.tick(&mut host);
    assert!(matches!(
        client.conn_state(),
        ConnState::Closed | ConnState::Errored
    ));

    server.join().expect("server thread");
}
