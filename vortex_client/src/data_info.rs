use crate::error::ClientError;
use crate::protocol::{DataInfoPayload, DatasetConfig, FrameHeader};
use std::fmt;
use tracing::debug;

/// Server-reported dataset configuration plus the per-frame header
/// table, replaced wholesale on each `dataInfo` response.
pub struct DataInfoStore {
    cfg: Option<DatasetConfig>,
    hdrs: Vec<FrameHeader>,
    inclusions: serde_json::Value,
}

impl DataInfoStore {
    pub fn new() -> Self {
        Self {
            cfg: None,
            hdrs: Vec::new(),
            inclusions: serde_json::Value::Null,
        }
    }

    pub fn update(&mut self, data: DataInfoPayload) {
        debug!(headers = data.hdrs.len(), "data info updated");
        self.cfg = Some(data.cfg);
        self.hdrs = data.hdrs;
        self.inclusions = data.inclusions;
    }

    pub fn dt(&self) -> Option<f64> {
        self.cfg.as_ref().map(|c| c.dt)
    }

    pub fn header(&self, frame: usize) -> Option<&FrameHeader> {
        self.hdrs.get(frame)
    }

    pub fn frame_count(&self) -> usize {
        self.hdrs.len()
    }

    pub fn inclusions(&self) -> &serde_json::Value {
        &self.inclusions
    }

    /// Header plus derived simulation time for one frame. Fails with a
    /// lookup error when the frame is out of range or no `dataInfo`
    /// response has arrived yet.
    pub fn frame_info(&self, frame: usize) -> Result<FrameInfo, ClientError> {
        let cfg = self.cfg.as_ref().ok_or(ClientError::Lookup { frame })?;
        let hdr = self.hdrs.get(frame).ok_or(ClientError::Lookup { frame })?;
        Ok(FrameInfo {
            frame,
            timestep: hdr.timestep,
            t: hdr.timestep as f64 * cfg.dt,
            b: [hdr.bx, hdr.by, hdr.bz],
            v: hdr.v,
        })
    }
}

impl Default for DataInfoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub frame: usize,
    pub timestep: i64,
    pub t: f64,
    pub b: [f64; 3],
    pub v: f64,
}

impl fmt::Display for FrameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame={}, timestep={}, t={:.3}, B=({:.3}, {:.3}, {:.3}), V={:.3}",
            self.frame, self.timestep, self.t, self.b[0], self.b[1], self.b[2], self.v
        )
    }
}
