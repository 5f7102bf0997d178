use crate::curve::{CatmullRom3, TubeGeometry};
use crate::error::ClientError;
use crate::protocol::VortexLineRecord;
use crate::render_host::RenderHost;
use glam::Vec3;
use tracing::{debug, warn};

/// Tube radius matching the original visualization.
pub const TUBE_RADIUS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// The renderable representation of one frame. Four parallel
/// sequences; index `i` refers to the same vortex line in all of them.
/// Replaced wholesale on each rebuild, never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    pub curves: Vec<CatmullRom3>,
    pub colors: Vec<Rgb8>,
    pub ids: Vec<i64>,
    pub anchors: Vec<Vec3>,
}

impl SceneState {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Builds the scene for each incoming frame and keeps the host's tube
/// drawables in sync with it.
pub struct FrameScene {
    state: SceneState,
    handles: Vec<usize>,
}

impl FrameScene {
    pub fn new() -> Self {
        Self {
            state: SceneState::default(),
            handles: Vec::new(),
        }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Replaces the current scene with one built from `records`.
    /// Previous tube drawables are removed before anything new is
    /// created. Malformed records are skipped and logged; they never
    /// abort the rest of the batch.
    pub fn rebuild(&mut self, records: &[VortexLineRecord], host: &mut dyn RenderHost) {
        for handle in self.handles.drain(..) {
            host.remove_tube(handle);
        }

        let mut next = SceneState::default();
        for record in records {
            let curve = match curve_from_record(record) {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "skipping vortex line record");
                    continue;
                }
            };
            next.anchors.push(curve.first());
            next.curves.push(curve);
            next.colors.push(Rgb8 {
                r: record.r,
                g: record.g,
                b: record.b,
            });
            next.ids.push(record.gid);
        }

        let mut handles = Vec::with_capacity(next.curves.len());
        for (curve, color) in next.curves.iter().zip(&next.colors) {
            let tube = TubeGeometry::sweep(curve, TUBE_RADIUS);
            handles.push(host.add_tube(&tube, *color));
        }

        debug!(
            lines = next.len(),
            skipped = records.len() - next.len(),
            "rebuilt frame scene"
        );

        // Whole-state swap; a render tick never sees a half-built scene.
        self.state = next;
        self.handles = handles;
    }
}

impl Default for FrameScene {
    fn default() -> Self {
        Self::new()
    }
}

fn curve_from_record(record: &VortexLineRecord) -> Result<CatmullRom3, ClientError> {
    if record.verts.len() % 3 != 0 {
        return Err(ClientError::Record {
            gid: record.gid,
            reason: "vertex array length is not a multiple of 3",
        });
    }
    if record.verts.len() < 6 {
        return Err(ClientError::Record {
            gid: record.gid,
            reason: "fewer than 2 vertices",
        });
    }

    let points = record
        .verts
        .chunks_exact(3)
        .map(|v| Vec3::new(v[0], v[1], v[2]))
        .collect();
    Ok(CatmullRom3::new(points))
}
