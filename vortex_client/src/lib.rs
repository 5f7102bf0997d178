mod camera;
mod client;
mod conn;
mod curve;
mod data_info;
mod error;
mod net;
mod overlay;
mod protocol;
mod render_host;
mod scene;

pub use camera::CameraView;
pub use client::VortexClient;
pub use conn::{ConnState, ConnectionManager};
pub use curve::{CatmullRom3, TubeGeometry, SAMPLES_PER_SEGMENT, TUBE_SIDES};
pub use data_info::{DataInfoStore, FrameInfo};
pub use error::ClientError;
pub use net::NetworkThread;
pub use overlay::{OverlayProjector, LABEL_HEIGHT_MARGIN, LABEL_WIDTH_MARGIN};
pub use protocol::{SocketEvent, INBOUND_CAP, OUTBOUND_CAP};
pub use render_host::{RecordedLabel, RecordingHost, RenderHost};
pub use scene::{FrameScene, Rgb8, SceneState, TUBE_RADIUS};

pub use vlines_protocol::{
    ClientRequest, DataInfoPayload, DatasetConfig, FrameHeader, ServerMessage, VortexLineRecord,
};
