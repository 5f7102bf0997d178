use serde::{Deserialize, Serialize};

/// Requests sent by the visualization client over the frame-streaming
/// socket. One JSON text frame per request, discriminated by `type`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ClientRequest {
    RequestDataInfo { dbname: String },
    RequestFrame { dbname: String, frame: usize },
}

impl ClientRequest {
    pub fn dbname(&self) -> &str {
        match self {
            ClientRequest::RequestDataInfo { dbname } => dbname,
            ClientRequest::RequestFrame { dbname, .. } => dbname,
        }
    }
}

/// Responses from the data server. Unknown `type` tags fail
/// deserialization; the client logs and drops such frames.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ServerMessage {
    DataInfo { data: DataInfoPayload },
    Vlines { data: Vec<VortexLineRecord> },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DataInfoPayload {
    pub cfg: DatasetConfig,
    pub hdrs: Vec<FrameHeader>,
    /// Material inclusion geometry, forwarded opaquely to the host.
    #[serde(default)]
    pub inclusions: serde_json::Value,
}

/// Server-reported global dataset settings. Only `dt` is interpreted by
/// the client; everything else the server sends is kept as-is.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DatasetConfig {
    pub dt: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-frame scalar metadata: timestep index, applied field vector B,
/// and voltage V.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct FrameHeader {
    pub timestep: i64,
    #[serde(rename = "Bx")]
    pub bx: f64,
    #[serde(rename = "By")]
    pub by: f64,
    #[serde(rename = "Bz")]
    pub bz: f64,
    #[serde(rename = "V")]
    pub v: f64,
}

/// One vortex line on the wire: global id, RGB color, and a flat
/// x/y/z-interleaved vertex array (length must be a multiple of 3).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VortexLineRecord {
    pub gid: i64,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub verts: Vec<f32>,
}
