use crate::bounds::BoundingBox;
use crate::bsp::BspTree;
use crate::error::IndexError;
use crate::point_set::random_points;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

/// Nearest-point result exposed to JavaScript.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct Nearest3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Index of the point in the buffer passed to `set_points`.
    pub index: usize,
    pub distance: f64,
    pub leaf_visits: usize,
}

/// The main container for 3D nearest-neighbor queries.
///
/// This struct manages:
/// - The **points** (a flat `[x, y, z, ...]` buffer) to index.
/// - The **BSP tree** built over them for fast spatial lookups.
#[wasm_bindgen]
pub struct PointIndex {
    points: Vec<f64>,
    tree: BspTree,
}

#[wasm_bindgen]
impl PointIndex {
    #[wasm_bindgen(constructor)]
    pub fn new() -> PointIndex {
        PointIndex {
            points: Vec::new(),
            tree: BspTree::new(),
        }
    }

    /// Replaces the point buffer. The tree is untouched until the next
    /// `build` call.
    pub fn set_points(&mut self, points: &[f64]) {
        self.points = points.to_vec();
    }

    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> {
        self.points.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn count_points(&self) -> usize {
        self.points.len() / 3
    }

    /// Nodes created by the last build, not counting the root.
    #[wasm_bindgen(getter)]
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    /// Fills the buffer with `count` random points inside the given box.
    pub fn random_points(
        &mut self,
        count: usize,
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) {
        let bounds = BoundingBox::new([min_x, min_y, min_z], [max_x, max_y, max_z]);
        self.points = random_points(count, &bounds);
    }

    /// Builds the tree over the current point buffer.
    ///
    /// Returns the number of nodes created beyond the root.
    pub fn build(&mut self, max_leaf_size: usize, max_depth: usize) -> usize {
        self.tree.build(self.points.as_slice(), max_leaf_size, max_depth)
    }

    /// The closest indexed point to `(x, y, z)`.
    pub fn nearest(&self, x: f64, y: f64, z: f64) -> Result<Nearest3D, JsValue> {
        let found = self
            .tree
            .nearest(self.points.as_slice(), [x, y, z])
            .map_err(to_js)?;
        Ok(Nearest3D {
            x: found.position[0],
            y: found.position[1],
            z: found.position[2],
            index: found.index,
            distance: found.distance,
            leaf_visits: found.leaf_visits,
        })
    }

    /// Indices of the `k` closest points, ordered nearest to farthest.
    pub fn k_nearest(&self, x: f64, y: f64, z: f64, k: usize) -> Result<Vec<usize>, JsValue> {
        Ok(self.tree.k_nearest([x, y, z], k).map_err(to_js)?.indices)
    }

    /// Indices of all points strictly within `radius` of `(x, y, z)`.
    pub fn ball(&self, x: f64, y: f64, z: f64, radius: f64) -> Result<Vec<usize>, JsValue> {
        Ok(self.tree.ball([x, y, z], radius).map_err(to_js)?.indices)
    }
}

fn to_js(err: IndexError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
