use glam::Vec3;

pub const TUBE_SIDES: usize = 8;
pub const SAMPLES_PER_SEGMENT: usize = 8;

/// A Catmull-Rom spline through an ordered vertex sequence. Endpoints
/// are clamped (virtual control points duplicate the ends), so the
/// curve passes through every input vertex in order.
#[derive(Debug, Clone)]
pub struct CatmullRom3 {
    points: Vec<Vec3>,
}

impl CatmullRom3 {
    /// Callers must pass at least 2 points; record validation upstream
    /// guarantees this for wire data.
    pub fn new(points: Vec<Vec3>) -> Self {
        debug_assert!(points.len() >= 2);
        Self { points }
    }

    pub fn first(&self) -> Vec3 {
        self.points[0]
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Evaluates the spline at `t` in [0, 1] across the whole chain.
    pub fn sample(&self, t: f32) -> Vec3 {
        let n = self.points.len();
        let segments = (n - 1) as f32;
        let scaled = t.clamp(0.0, 1.0) * segments;
        let i = (scaled.floor() as usize).min(n - 2);
        let u = scaled - i as f32;

        let p0 = self.points[i.saturating_sub(1)];
        let p1 = self.points[i];
        let p2 = self.points[i + 1];
        let p3 = self.points[(i + 2).min(n - 1)];

        catmull_rom(p0, p1, p2, p3, u)
    }

    /// Uniformly spaced samples, `SAMPLES_PER_SEGMENT` per input
    /// segment plus the final endpoint.
    pub fn sample_points(&self) -> Vec<Vec3> {
        let count = (self.points.len() - 1) * SAMPLES_PER_SEGMENT + 1;
        (0..count)
            .map(|k| self.sample(k as f32 / (count - 1) as f32))
            .collect()
    }
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, u: f32) -> Vec3 {
    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
}

/// Triangle mesh for one vortex tube: a circular cross-section swept
/// along the sampled curve at a fixed radius.
#[derive(Debug, Clone)]
pub struct TubeGeometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl TubeGeometry {
    pub fn sweep(curve: &CatmullRom3, radius: f32) -> Self {
        let centers = curve.sample_points();
        let mut positions = Vec::with_capacity(centers.len() * TUBE_SIDES);
        let mut indices = Vec::with_capacity((centers.len() - 1) * TUBE_SIDES * 6);

        // Transport the ring normal along the curve so consecutive
        // rings stay aligned and the tube does not twist.
        let mut normal = perpendicular(tangent_at(&centers, 0));

        for (i, &center) in centers.iter().enumerate() {
            let tangent = tangent_at(&centers, i);
            normal = (normal - tangent * normal.dot(tangent)).normalize_or_zero();
            if normal == Vec3::ZERO {
                normal = perpendicular(tangent);
            }
            let binormal = tangent.cross(normal).normalize_or_zero();

            for s in 0..TUBE_SIDES {
                let theta = s as f32 / TUBE_SIDES as f32 * std::f32::consts::TAU;
                positions.push(center + radius * (normal * theta.cos() + binormal * theta.sin()));
            }
        }

        for ring in 0..centers.len() - 1 {
            let base = (ring * TUBE_SIDES) as u32;
            let next = base + TUBE_SIDES as u32;
            for s in 0..TUBE_SIDES as u32 {
                let s1 = (s + 1) % TUBE_SIDES as u32;
                indices.extend_from_slice(&[base + s, next + s, next + s1]);
                indices.extend_from_slice(&[base + s, next + s1, base + s1]);
            }
        }

        Self { positions, indices }
    }
}

fn tangent_at(centers: &[Vec3], i: usize) -> Vec3 {
    let prev = centers[i.saturating_sub(1)];
    let next = centers[(i + 1).min(centers.len() - 1)];
    (next - prev).normalize_or(Vec3::Z)
}

fn perpendicular(v: Vec3) -> Vec3 {
    let axis = if v.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    v.cross(axis).normalize_or(Vec3::X)
}
