use glam::{Mat4, Vec2, Vec3};

/// The contract the hosting renderer provides each tick: the current
/// view-projection transform and viewport size in pixels.
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    pub view_proj: Mat4,
    pub width: f32,
    pub height: f32,
}

impl CameraView {
    pub fn new(view_proj: Mat4, width: f32, height: f32) -> Self {
        Self {
            view_proj,
            width,
            height,
        }
    }

    /// Perspective camera looking at `target` from `eye`, Y-up.
    pub fn perspective(
        eye: Vec3,
        target: Vec3,
        fov_y: f32,
        width: f32,
        height: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(fov_y, width / height, near, far);
        Self::new(proj * view, width, height)
    }

    /// Projects a world-space point to pixel coordinates. `None` when
    /// the point is at or behind the camera plane (w <= 0), where NDC
    /// is meaningless.
    pub fn project_to_pixels(&self, p: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(Vec2::new(
            (ndc_x + 1.0) / 2.0 * self.width,
            -(ndc_y - 1.0) / 2.0 * self.height,
        ))
    }
}
