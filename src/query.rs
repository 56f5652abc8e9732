use crate::bsp::{BspTree, Node};
use crate::error::IndexError;
use crate::point_set::PointSet;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Index value carried by the k-nearest heap sentinel, never reported.
const SENTINEL: usize = usize::MAX;

/// Result of a [`nearest`](BspTree::nearest) query.
#[derive(Clone, Copy, Debug)]
pub struct Nearest {
    /// Index of the closest point in the queried point set.
    pub index: usize,
    /// Canonical position of that point, resolved through the point set.
    pub position: [f64; 3],
    /// Euclidean distance from the query point.
    pub distance: f64,
    /// Number of leaf nodes scanned.
    pub leaf_visits: usize,
}

/// Result of a [`k_nearest`](BspTree::k_nearest) query.
#[derive(Clone, Debug)]
pub struct KNearest {
    /// Point indices ordered from nearest to farthest.
    pub indices: Vec<usize>,
    /// Number of leaf nodes scanned.
    pub leaf_visits: usize,
}

/// Result of a [`ball`](BspTree::ball) query.
#[derive(Clone, Debug)]
pub struct Ball {
    /// Indices of all points strictly inside the query sphere, in no
    /// particular order.
    pub indices: Vec<usize>,
    /// Number of leaf nodes scanned.
    pub leaf_visits: usize,
}

struct NearestSearch {
    query: [f64; 3],
    dist_sq: f64,
    nearest: usize,
    leaf_visits: usize,
}

struct KNearestSearch {
    query: [f64; 3],
    candidates: KnnQueue,
    leaf_visits: usize,
}

struct BallSearch {
    query: [f64; 3],
    radius_sq: f64,
    indices: Vec<usize>,
    leaf_visits: usize,
}

impl BspTree {
    /// Finds the single closest indexed point to `query`.
    ///
    /// `points` must be the point set the tree was built from; the reported
    /// position is resolved through it rather than read back from the
    /// element buffer.
    pub fn nearest<P: PointSet + ?Sized>(
        &self,
        points: &P,
        query: [f64; 3],
    ) -> Result<Nearest, IndexError> {
        let root = self.query_root()?;
        let mut search = NearestSearch {
            query,
            dist_sq: f64::INFINITY,
            nearest: SENTINEL,
            leaf_visits: 0,
        };
        self.nearest_recurse(root, &mut search);

        Ok(Nearest {
            index: search.nearest,
            position: points.position(search.nearest),
            distance: search.dist_sq.sqrt(),
            leaf_visits: search.leaf_visits,
        })
    }

    /// Answers one [`nearest`](Self::nearest) query per `[x, y, z]` triple in
    /// the flat `queries` buffer, in parallel.
    pub fn nearest_batch<P>(&self, points: &P, queries: &[f64]) -> Result<Vec<Nearest>, IndexError>
    where
        P: PointSet + Sync + ?Sized,
    {
        self.query_root()?;
        (0..queries.len() / 3)
            .into_par_iter()
            .map(|i| {
                let query = [queries[i * 3], queries[i * 3 + 1], queries[i * 3 + 2]];
                self.nearest(points, query)
            })
            .collect()
    }

    /// Finds the `k` closest indexed points to `query`, ordered from nearest
    /// to farthest.
    ///
    /// A `k` larger than the number of indexed points is capped, so at most
    /// [`len`](Self::len) indices come back; `k = 0` yields an empty result
    /// without traversing.
    pub fn k_nearest(&self, query: [f64; 3], k: usize) -> Result<KNearest, IndexError> {
        let root = self.query_root()?;
        if k == 0 {
            return Ok(KNearest {
                indices: Vec::new(),
                leaf_visits: 0,
            });
        }

        let mut search = KNearestSearch {
            query,
            candidates: KnnQueue::new(k.min(self.elements.len())),
            leaf_visits: 0,
        };
        self.k_nearest_recurse(root, &mut search);

        Ok(KNearest {
            indices: search.candidates.into_sorted_indices(),
            leaf_visits: search.leaf_visits,
        })
    }

    /// Collects every indexed point strictly within `radius` of `query`.
    ///
    /// Points at exactly `radius` are excluded.
    pub fn ball(&self, query: [f64; 3], radius: f64) -> Result<Ball, IndexError> {
        let root = self.query_root()?;
        let mut search = BallSearch {
            query,
            radius_sq: radius * radius,
            indices: Vec::new(),
            leaf_visits: 0,
        };
        self.ball_recurse(root, &mut search);

        Ok(Ball {
            indices: search.indices,
            leaf_visits: search.leaf_visits,
        })
    }

    fn query_root(&self) -> Result<&Node, IndexError> {
        match &self.root {
            Some(root) if !self.elements.is_empty() => Ok(root),
            _ => Err(IndexError::EmptyIndex),
        }
    }

    fn nearest_recurse(&self, node: &Node, search: &mut NearestSearch) {
        if let Some(children) = &node.children {
            let off = search.query[node.split_axis] - node.split_value;
            // a query exactly on the splitting plane descends the upper side first
            let (near, far) = if off < 0.0 {
                (&children[0], &children[1])
            } else {
                (&children[1], &children[0])
            };
            self.nearest_recurse(near, search);
            if off * off < search.dist_sq {
                self.nearest_recurse(far, search);
            }
        } else {
            search.leaf_visits += 1;
            for element in &self.elements[node.start..node.end] {
                let d = dist_sq(element.position, search.query);
                if d < search.dist_sq {
                    search.dist_sq = d;
                    search.nearest = element.index;
                }
            }
        }
    }

    fn k_nearest_recurse(&self, node: &Node, search: &mut KNearestSearch) {
        if let Some(children) = &node.children {
            let off = search.query[node.split_axis] - node.split_value;
            let (near, far) = if off < 0.0 {
                (&children[0], &children[1])
            } else {
                (&children[1], &children[0])
            };
            self.k_nearest_recurse(near, search);
            if off * off < search.candidates.worst_dist_sq() {
                self.k_nearest_recurse(far, search);
            }
        } else {
            search.leaf_visits += 1;
            for element in &self.elements[node.start..node.end] {
                search
                    .candidates
                    .offer(element.index, dist_sq(element.position, search.query));
            }
        }
    }

    fn ball_recurse(&self, node: &Node, search: &mut BallSearch) {
        if let Some(children) = &node.children {
            let off = search.query[node.split_axis] - node.split_value;
            let (near, far) = if off < 0.0 {
                (&children[0], &children[1])
            } else {
                (&children[1], &children[0])
            };
            self.ball_recurse(near, search);
            if off * off < search.radius_sq {
                self.ball_recurse(far, search);
            }
        } else {
            search.leaf_visits += 1;
            for element in &self.elements[node.start..node.end] {
                if dist_sq(element.position, search.query) < search.radius_sq {
                    search.indices.push(element.index);
                }
            }
        }
    }
}

struct Candidate {
    index: usize,
    dist_sq: f64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.dist_sq == other.dist_sq
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.dist_sq.partial_cmp(&other.dist_sq)
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Bounded max-heap of the best candidates seen so far, keyed by squared
/// distance. A single +∞ sentinel seeds the heap so the worst retained
/// distance is defined before `capacity` real candidates have been
/// collected.
struct KnnQueue {
    heap: BinaryHeap<Candidate>,
    capacity: usize,
}

impl KnnQueue {
    fn new(capacity: usize) -> KnnQueue {
        let mut heap = BinaryHeap::with_capacity(capacity + 2);
        heap.push(Candidate {
            index: SENTINEL,
            dist_sq: f64::INFINITY,
        });
        KnnQueue { heap, capacity }
    }

    /// Squared distance of the worst retained candidate; the pruning
    /// threshold of the traversal.
    fn worst_dist_sq(&self) -> f64 {
        self.heap.peek().map_or(f64::INFINITY, |c| c.dist_sq)
    }

    /// Admits the candidate if it beats the current worst, evicting the
    /// worst once more than `capacity` entries are retained.
    fn offer(&mut self, index: usize, dist_sq: f64) {
        if dist_sq < self.worst_dist_sq() {
            self.heap.push(Candidate { index, dist_sq });
            if self.heap.len() > self.capacity {
                self.heap.pop();
            }
        }
    }

    /// Drains into indices ordered nearest first, dropping the sentinel if
    /// it is still retained.
    fn into_sorted_indices(self) -> Vec<usize> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .filter(|c| c.index != SENTINEL)
            .map(|c| c.index)
            .collect()
    }
}

fn dist_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knn_queue_sentinel_lifecycle() {
        let mut queue = KnnQueue::new(2);
        assert_eq!(queue.worst_dist_sq(), f64::INFINITY);

        queue.offer(7, 4.0);
        // one real candidate: the sentinel still defines the worst
        assert_eq!(queue.worst_dist_sq(), f64::INFINITY);

        queue.offer(3, 1.0);
        // capacity reached: the sentinel is evicted
        assert_eq!(queue.worst_dist_sq(), 4.0);

        queue.offer(9, 9.0);
        assert_eq!(queue.worst_dist_sq(), 4.0, "a worse candidate must be rejected");

        queue.offer(1, 0.25);
        assert_eq!(queue.worst_dist_sq(), 1.0);

        assert_eq!(queue.into_sorted_indices(), vec![1, 3]);
    }

    #[test]
    fn test_knn_queue_underfilled_drain() {
        let mut queue = KnnQueue::new(4);
        queue.offer(2, 2.0);
        queue.offer(5, 0.5);
        assert_eq!(
            queue.into_sorted_indices(),
            vec![5, 2],
            "the sentinel must never leak into the drained indices"
        );
    }
}
