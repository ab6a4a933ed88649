//! Quadtree spatial index over landmark positions
//!
//! The tree covers the whole WGS-84 degree plane (x = longitude, y = latitude) and
//! stores `(index, coordinate)` entries, where `index` is the entry's position in the
//! owning store. Leaves split into four children once they hold more than the
//! configured bucket size, down to a fixed maximum depth.

use crate::utils;
use geo::{Coord, Rect};
use smallvec::SmallVec;

/// Maximum depth of the quadtree to prevent infinite recursion on duplicate points
const MAX_DEPTH: u32 = 24;

/// Inline capacity of a node's entry list before it spills to the heap
const INLINE_ENTRIES: usize = 8;

/// A point stored in the index
#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry {
    /// Index of the location in the owning store
    index: usize,
    /// Position in `geo` axis order
    point: Coord<f64>,
}

/// Root container for the point quadtree
#[derive(Debug, Clone)]
pub struct Quadtree {
    root: QuadtreeNode,
    /// Leaf capacity before subdivision
    max_entries_per_node: usize,
    /// Total number of entries
    len: usize,
}

/// A single node of the quadtree
#[derive(Debug, Clone)]
struct QuadtreeNode {
    /// Bounds in degrees
    bounding_box: Rect<f64>,
    /// Depth level in the tree (0 = root)
    level: u32,
    /// Entries stored here (leaves only, or any node at `MAX_DEPTH`)
    entries: SmallVec<[Entry; INLINE_ENTRIES]>,
    /// Child nodes (NW, NE, SW, SE) if subdivided
    children: Option<Box<[QuadtreeNode; 4]>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Quadtree {
    /// Create an empty quadtree covering the whole world
    pub fn new(max_entries_per_node: usize) -> Self {
        Self {
            root: QuadtreeNode::new(utils::world_rect(), 0),
            max_entries_per_node: max_entries_per_node.max(1),
            len: 0,
        }
    }

    /// Build a tree from `(lat, lng)` positions; entry `i` gets index `i`
    pub fn from_points<I>(points: I, max_entries_per_node: usize) -> Self
    where
        I: IntoIterator<Item = crate::Coordinate>,
    {
        let mut tree = Self::new(max_entries_per_node);
        for (index, position) in points.into_iter().enumerate() {
            tree.insert(index, position.to_geo());
        }
        tree
    }

    /// Insert an entry. Points outside the world bounds are ignored.
    pub fn insert(&mut self, index: usize, point: Coord<f64>) -> bool {
        if !utils::rect_contains_inclusive(&self.root.bounding_box, point) {
            tracing::warn!(index, "Not indexing point outside world bounds: {:?}", point);
            return false;
        }
        self.root
            .insert(Entry { index, point }, self.max_entries_per_node);
        self.len += 1;
        true
    }

    /// Indices of every entry inside `rect` (edges inclusive), ascending
    pub fn query(&self, rect: Rect<f64>) -> Vec<usize> {
        let mut results = Vec::new();
        self.root.query(rect, &mut results);
        results.sort_unstable();
        results
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Deepest level that currently has nodes
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }
}

impl QuadtreeNode {
    fn new(bounding_box: Rect<f64>, level: u32) -> Self {
        Self {
            bounding_box,
            level,
            entries: SmallVec::new(),
            children: None,
        }
    }

    fn insert(&mut self, entry: Entry, capacity: usize) {
        if let Some(children) = &mut self.children {
            children[Self::child_slot(&self.bounding_box, entry.point)].insert(entry, capacity);
            return;
        }

        self.entries.push(entry);

        if self.entries.len() > capacity && self.level < MAX_DEPTH {
            self.subdivide(capacity);
        }
    }

    /// Split into 4 children and push the entries down
    fn subdivide(&mut self, capacity: usize) {
        let min = self.bounding_box.min();
        let max = self.bounding_box.max();
        let mid_x = (min.x + max.x) / 2.0;
        let mid_y = (min.y + max.y) / 2.0;
        let child_level = self.level + 1;

        let nw = QuadtreeNode::new(
            Rect::new(Coord { x: min.x, y: mid_y }, Coord { x: mid_x, y: max.y }),
            child_level,
        );
        let ne = QuadtreeNode::new(
            Rect::new(Coord { x: mid_x, y: mid_y }, Coord { x: max.x, y: max.y }),
            child_level,
        );
        let sw = QuadtreeNode::new(
            Rect::new(Coord { x: min.x, y: min.y }, Coord { x: mid_x, y: mid_y }),
            child_level,
        );
        let se = QuadtreeNode::new(
            Rect::new(Coord { x: mid_x, y: min.y }, Coord { x: max.x, y: mid_y }),
            child_level,
        );

        let mut children = Box::new([nw, ne, sw, se]);
        for entry in self.entries.drain(..) {
            children[Self::child_slot(&self.bounding_box, entry.point)].insert(entry, capacity);
        }
        self.children = Some(children);
    }

    /// Child index for a point; points on a split line go east / north
    fn child_slot(bounding_box: &Rect<f64>, point: Coord<f64>) -> usize {
        let center = bounding_box.center();
        let is_east = point.x >= center.x;
        let is_north = point.y >= center.y;

        match (is_east, is_north) {
            (false, true) => 0,  // NW
            (true, true) => 1,   // NE
            (false, false) => 2, // SW
            (true, false) => 3,  // SE
        }
    }

    fn query(&self, rect: Rect<f64>, results: &mut Vec<usize>) {
        if !utils::rects_overlap(&self.bounding_box, &rect) {
            return;
        }

        results.extend(
            self.entries
                .iter()
                .filter(|e| utils::rect_contains_inclusive(&rect, e.point))
                .map(|e| e.index),
        );

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(rect, results);
            }
        }
    }

    fn depth(&self) -> u32 {
        match &self.children {
            Some(children) => children.iter().map(|c| c.depth()).max().unwrap_or(self.level),
            None => self.level,
        }
    }
}
