use crate::curve::TubeGeometry;
use crate::scene::Rgb8;
use glam::Vec2;
use std::collections::HashMap;

/// Seam to the external 3D engine and overlay surface. The engine owns
/// drawing; the client only adds/removes tube drawables and positions
/// screen-space labels keyed by the line's persistent gid.
///
/// `hide_label` and `remove_label` must tolerate gids that were never
/// shown.
pub trait RenderHost {
    fn add_tube(&mut self, geometry: &TubeGeometry, color: Rgb8) -> usize;
    fn remove_tube(&mut self, handle: usize);

    fn upsert_label(&mut self, gid: i64, text: &str, pos: Vec2);
    fn hide_label(&mut self, gid: i64);
    fn remove_label(&mut self, gid: i64);
}

#[derive(Debug, Clone)]
pub struct RecordedLabel {
    pub text: String,
    pub pos: Vec2,
    pub visible: bool,
}

/// In-memory host that records what a real engine would draw. Used by
/// the headless viewer and the tests.
#[derive(Default)]
pub struct RecordingHost {
    next_handle: usize,
    pub tubes: HashMap<usize, (usize, Rgb8)>,
    pub labels: HashMap<i64, RecordedLabel>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_labels(&self) -> usize {
        self.labels.values().filter(|l| l.visible).count()
    }
}

impl RenderHost for RecordingHost {
    fn add_tube(&mut self, geometry: &TubeGeometry, color: Rgb8) -> usize {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.tubes.insert(handle, (geometry.positions.len(), color));
        handle
    }

    fn remove_tube(&mut self, handle: usize) {
        self.tubes.remove(&handle);
    }

    fn upsert_label(&mut self, gid: i64, text: &str, pos: Vec2) {
        self.labels.insert(
            gid,
            RecordedLabel {
                text: text.to_string(),
                pos,
                visible: true,
            },
        );
    }

    fn hide_label(&mut self, gid: i64) {
        if let Some(label) = self.labels.get_mut(&gid) {
            label.visible = false;
        }
    }

    fn remove_label(&mut self, gid: i64) {
        self.labels.remove(&gid);
    }
}
