use crate::camera::CameraView;
use crate::render_host::RenderHost;
use crate::scene::SceneState;
use glam::Vec2;
use std::collections::HashSet;

/// Space reserved at the right/bottom viewport edges for label text.
pub const LABEL_WIDTH_MARGIN: f32 = 50.0;
pub const LABEL_HEIGHT_MARGIN: f32 = 25.0;

/// Re-derives the screen position of every line's id label each render
/// tick. Labels are keyed by the line's persistent gid, so a scene that
/// shrinks between ticks cannot leak or misassign stale labels.
pub struct OverlayProjector {
    enabled: bool,
    live: HashSet<i64>,
}

impl OverlayProjector {
    pub fn new() -> Self {
        Self {
            enabled: true,
            live: HashSet::new(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Removes every label from the host. Called when the owning scene
    /// is torn down.
    pub fn clear(&mut self, host: &mut dyn RenderHost) {
        for gid in self.live.drain() {
            host.remove_label(gid);
        }
    }

    /// One projection pass. Cost is bounded by the scene size; a
    /// stable scene never accumulates labels across ticks.
    pub fn update(&mut self, scene: &SceneState, camera: &CameraView, host: &mut dyn RenderHost) {
        let current: HashSet<i64> = scene.ids.iter().copied().collect();
        self.live.retain(|gid| {
            if current.contains(gid) {
                true
            } else {
                host.remove_label(*gid);
                false
            }
        });

        for (i, &gid) in scene.ids.iter().enumerate() {
            self.live.insert(gid);
            let px = camera.project_to_pixels(scene.anchors[i]);
            match px {
                Some(px) if self.enabled && in_label_bounds(px, camera) => {
                    host.upsert_label(gid, &gid.to_string(), px);
                }
                _ => host.hide_label(gid),
            }
        }
    }
}

impl Default for OverlayProjector {
    fn default() -> Self {
        Self::new()
    }
}

fn in_label_bounds(px: Vec2, camera: &CameraView) -> bool {
    px.x >= 0.0
        && px.x < camera.width - LABEL_WIDTH_MARGIN
        && px.y >= 0.0
        && px.y < camera.height - LABEL_HEIGHT_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CatmullRom3;
    use crate::render_host::RecordingHost;
    use crate::scene::Rgb8;
    use glam::{Mat4, Vec3};

    fn flat_camera(width: f32, height: f32) -> CameraView {
        CameraView::new(Mat4::IDENTITY, width, height)
    }

    /// An NDC x that projects to exactly `px` on a `width`-wide viewport.
    fn ndc_for_px(px: f32, extent: f32) -> f32 {
        2.0 * px / extent - 1.0
    }

    fn scene_with_anchor(gid: i64, anchor: Vec3) -> SceneState {
        SceneState {
            curves: vec![CatmullRom3::new(vec![anchor, anchor + Vec3::X])],
            colors: vec![Rgb8 { r: 1, g: 2, b: 3 }],
            ids: vec![gid],
            anchors: vec![anchor],
        }
    }

    #[test]
    fn label_inside_margin_is_visible() {
        let cam = flat_camera(200.0, 100.0);
        let x = ndc_for_px(200.0 - LABEL_WIDTH_MARGIN - 1.0, 200.0);
        let scene = scene_with_anchor(5, Vec3::new(x, 0.0, 0.0));

        let mut proj = OverlayProjector::new();
        let mut host = RecordingHost::new();
        proj.update(&scene, &cam, &mut host);
        assert!(host.labels[&5].visible);
        assert_eq!(host.labels[&5].text, "5");
    }

    #[test]
    fn label_at_margin_boundary_is_hidden() {
        let cam = flat_camera(200.0, 100.0);
        let x = ndc_for_px(200.0 - LABEL_WIDTH_MARGIN, 200.0);
        let scene = scene_with_anchor(5, Vec3::new(x, 0.0, 0.0));

        let mut proj = OverlayProjector::new();
        let mut host = RecordingHost::new();
        // Show it once somewhere visible first, then move to the boundary.
        proj.update(&scene_with_anchor(5, Vec3::ZERO), &cam, &mut host);
        assert!(host.labels[&5].visible);
        proj.update(&scene, &cam, &mut host);
        assert!(!host.labels[&5].visible);
    }

    #[test]
    fn disabled_labels_are_hidden() {
        let cam = flat_camera(200.0, 100.0);
        let scene = scene_with_anchor(5, Vec3::ZERO);

        let mut proj = OverlayProjector::new();
        let mut host = RecordingHost::new();
        proj.update(&scene, &cam, &mut host);
        assert!(host.labels[&5].visible);

        proj.set_enabled(false);
        proj.update(&scene, &cam, &mut host);
        assert!(!host.labels[&5].visible);
    }

    #[test]
    fn stale_gids_are_removed_when_scene_shrinks() {
        let cam = flat_camera(200.0, 100.0);
        let mut proj = OverlayProjector::new();
        let mut host = RecordingHost::new();

        let big = SceneState {
            curves: vec![
                CatmullRom3::new(vec![Vec3::ZERO, Vec3::X]),
                CatmullRom3::new(vec![Vec3::ZERO, Vec3::Y]),
                CatmullRom3::new(vec![Vec3::ZERO, Vec3::Z]),
            ],
            colors: vec![Rgb8 { r: 0, g: 0, b: 0 }; 3],
            ids: vec![1, 2, 3],
            anchors: vec![Vec3::ZERO; 3],
        };
        proj.update(&big, &cam, &mut host);
        assert_eq!(host.labels.len(), 3);

        let small = scene_with_anchor(2, Vec3::ZERO);
        proj.update(&small, &cam, &mut host);
        assert_eq!(host.labels.len(), 1);
        assert!(host.labels.contains_key(&2));
    }

    #[test]
    fn clear_removes_all_labels() {
        let cam = flat_camera(200.0, 100.0);
        let mut proj = OverlayProjector::new();
        let mut host = RecordingHost::new();
        proj.update(&scene_with_anchor(9, Vec3::ZERO), &cam, &mut host);
        assert_eq!(host.labels.len(), 1);

        proj.clear(&mut host);
        assert!(host.labels.is_empty());
    }
}
