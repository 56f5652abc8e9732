use crate::bounds::BoundingBox;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Read-only access to a collection of 3D points.
///
/// This is the seam to whatever container actually owns the points: a mesh
/// vertex buffer, a particle system, or a plain coordinate slice. Points are
/// enumerated as `0..len()`, and that enumeration index is the stable
/// identity every query result refers back to.
pub trait PointSet {
    /// Number of points in the set.
    fn len(&self) -> usize;

    /// Position of the point with the given index.
    fn position(&self, index: usize) -> [f64; 3];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flat coordinate buffers laid out `[x, y, z, x, y, z, ...]`.
impl PointSet for [f64] {
    fn len(&self) -> usize {
        self.len() / 3
    }

    fn position(&self, index: usize) -> [f64; 3] {
        [self[index * 3], self[index * 3 + 1], self[index * 3 + 2]]
    }
}

impl PointSet for [[f64; 3]] {
    fn len(&self) -> usize {
        self.len()
    }

    fn position(&self, index: usize) -> [f64; 3] {
        self[index]
    }
}

/// Generates `count` random points uniformly distributed inside `bounds`,
/// returned as a flat `[x, y, z, ...]` coordinate buffer.
pub fn random_points(count: usize, bounds: &BoundingBox) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(get_seed());
    let mut points = Vec::with_capacity(count * 3);
    for _ in 0..count {
        for axis in 0..3 {
            points.push(bounds.min[axis] + rng.r#gen::<f64>() * bounds.extent(axis));
        }
    }
    points
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789 // Fixed seed for tests
    }
}
