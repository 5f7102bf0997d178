//! Connects to a frame server, fetches one frame, and prints what the
//! renderer would draw. Useful for smoke-testing a server without a
//! display.

use anyhow::{bail, Context};
use glam::Vec3;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use vortex_client::{CameraView, ConnState, RecordingHost, VortexClient};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DBNAME: &str = "demo.db";

fn parse_arg_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let addr = parse_arg_value(&args, "--addr")
        .or_else(|| std::env::var("VLINES_WS_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let dbname = parse_arg_value(&args, "--dbname")
        .or_else(|| std::env::var("VLINES_DBNAME").ok())
        .unwrap_or_else(|| DEFAULT_DBNAME.to_string());
    let frame = parse_arg_value(&args, "--frame")
        .map(|s| s.parse::<usize>().context("invalid --frame"))
        .transpose()?
        .unwrap_or(0);
    let timeout_ms = parse_arg_value(&args, "--timeout-ms")
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(5000);

    let mut client = VortexClient::new(addr, dbname);
    client.set_frame(frame);
    client.connect();

    let mut host = RecordingHost::new();
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        client.tick(&mut host);
        if let Some(e) = client.last_conn_error() {
            bail!("connection failed: {e}");
        }
        if matches!(client.conn_state(), ConnState::Closed) {
            bail!("server closed the connection before sending a frame");
        }
        if !client.scene().is_empty() && client.store().frame_count() > 0 {
            break;
        }
        if Instant::now() >= deadline {
            bail!("timed out waiting for frame data");
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    // Same camera setup the browser client bootstraps with.
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

    match client.frame_info() {
        Ok(info) => println!("{info}"),
        Err(e) => println!("frame={frame} (no header: {e})"),
    }

    let scene = client.scene();
    for (i, &gid) in scene.ids.iter().enumerate() {
        let anchor = scene.anchors[i];
        let label = host.labels.get(&gid);
        let placement = match label {
            Some(l) if l.visible => format!("label at ({:.1}, {:.1})", l.pos.x, l.pos.y),
            _ => "label hidden".to_string(),
        };
        println!(
            "gid={gid} verts={} anchor=({:.2}, {:.2}, {:.2}) {placement}",
            scene.curves[i].point_count(),
            anchor.x,
            anchor.y,
            anchor.z
        );
    }

    Ok(())
}
