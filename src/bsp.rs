use crate::bounds::BoundingBox;
use crate::point_set::PointSet;

/// A point copied out of the point set at build time, tagged with the stable
/// index it carries in that set.
///
/// Elements are shuffled around the buffer while the tree is built, so after
/// a build only the `index` field still corresponds to the original
/// enumeration order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Element {
    pub(crate) position: [f64; 3],
    pub(crate) index: usize,
}

/// A partition-tree node covering the element range `start..end`.
///
/// Split metadata is only meaningful on internal nodes; a node is a leaf iff
/// it has no children, and the two children always exist together.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) split_axis: usize,
    pub(crate) split_value: f64,
    pub(crate) children: Option<Box<[Node; 2]>>,
}

impl Node {
    fn leaf(start: usize, end: usize) -> Node {
        Node {
            start,
            end,
            split_axis: 0,
            split_value: 0.0,
            children: None,
        }
    }
}

/// A binary space partition over a static set of 3D points.
///
/// [`build`](Self::build) copies positions and indices out of a [`PointSet`]
/// and recursively splits the longest bounding-box axis at its midpoint.
/// The built tree then answers [`nearest`](Self::nearest),
/// [`k_nearest`](Self::k_nearest) and [`ball`](Self::ball) queries with
/// branch-and-bound pruning. There is no incremental insertion or removal:
/// rebuild as often as needed, each build tears the previous tree down
/// completely before constructing the new one.
pub struct BspTree {
    pub(crate) elements: Vec<Element>,
    pub(crate) root: Option<Node>,
    node_count: usize,
}

impl BspTree {
    pub fn new() -> BspTree {
        BspTree {
            elements: Vec::new(),
            root: None,
            node_count: 0,
        }
    }

    /// Copies all points out of `points` and builds the partition tree.
    ///
    /// A range stops splitting once it holds no more than `max_leaf_size`
    /// elements or once `max_depth` levels of splits have been spent; such a
    /// range stays a leaf, however large. Coincident or otherwise degenerate
    /// point clouds are fine: a zero-extent split sends every element to the
    /// lower side and the depth budget still bounds the recursion.
    ///
    /// Returns the number of nodes created in addition to the root (every
    /// split adds exactly two).
    pub fn build<P: PointSet + ?Sized>(
        &mut self,
        points: &P,
        max_leaf_size: usize,
        max_depth: usize,
    ) -> usize {
        self.elements.clear();
        self.elements.reserve(points.len());
        for index in 0..points.len() {
            self.elements.push(Element {
                position: points.position(index),
                index,
            });
        }

        // tear down the previous tree before growing the new one
        self.root = None;
        self.node_count = 0;

        let mut root = Node::leaf(0, self.elements.len());
        self.split(&mut root, max_leaf_size, max_depth);
        self.root = Some(root);

        self.node_count
    }

    fn split(&mut self, node: &mut Node, max_leaf_size: usize, depth: usize) {
        let n = node.end - node.start;
        if depth == 0 || n <= max_leaf_size {
            return;
        }

        let mut bounds = BoundingBox::around(self.elements[node.start].position);
        for element in &self.elements[node.start..node.end] {
            bounds.enclose(element.position);
        }

        let axis = bounds.longest_axis();
        let split_value = bounds.midpoint(axis);
        node.split_axis = axis;
        node.split_value = split_value;

        // elements exactly on the splitting plane go to the lower side
        let mid = node.start
            + partition(&mut self.elements[node.start..node.end], |e| {
                e.position[axis] <= split_value
            });

        self.node_count += 2;
        let mut children = Box::new([Node::leaf(node.start, mid), Node::leaf(mid, node.end)]);
        self.split(&mut children[0], max_leaf_size, depth - 1);
        self.split(&mut children[1], max_leaf_size, depth - 1);
        node.children = Some(children);
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Nodes created by the last build, not counting the root.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Length of the longest root-to-leaf path, in splits.
    pub fn depth(&self) -> usize {
        fn node_depth(node: &Node) -> usize {
            match &node.children {
                Some(children) => 1 + node_depth(&children[0]).max(node_depth(&children[1])),
                None => 0,
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

/// Reorders `slice` in place so every element satisfying `pred` precedes
/// every element that does not, returning the size of the satisfying side.
/// Order within each side is unspecified.
fn partition<T, F>(slice: &mut [T], pred: F) -> usize
where
    F: Fn(&T) -> bool,
{
    let mut boundary = 0;
    for i in 0..slice.len() {
        if pred(&slice[i]) {
            slice.swap(boundary, i);
            boundary += 1;
        }
    }
    boundary
}
