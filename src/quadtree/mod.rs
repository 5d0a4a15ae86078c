mod node;

pub use node::{NodeId, Quadrant};

use crate::shape::{Boundary, Rectangle, Shape};
use crate::{Error, Point, ShapeId};
use log::warn;
use node::Node;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub center: Point,
    pub half_width: f32,
    pub half_height: f32,
    /// Entries a leaf holds before it tries to split.
    pub capacity: usize,
    /// Nodes are not split below this half extent.
    /// Also the largest shape extent the overlap search accounts for.
    pub min_node_radius: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            center: Point::new(0.0, 0.0),
            half_width: 1024.0,
            half_height: 1024.0,
            capacity: 4,
            min_node_radius: 10.0,
        }
    }
}

impl Config {
    pub fn new(center: Point, half_width: f32, half_height: f32) -> Self {
        Self {
            center,
            half_width,
            half_height,
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_min_node_radius(mut self, min_node_radius: f32) -> Self {
        self.min_node_radius = min_node_radius;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.center[0].is_finite() && self.center[1].is_finite()) {
            return Err(Error::InvalidConfig("center must be finite"));
        }
        if !(self.half_width.is_finite() && self.half_width >= 0.0) {
            return Err(Error::InvalidConfig("half_width must be finite and >= 0"));
        }
        if !(self.half_height.is_finite() && self.half_height >= 0.0) {
            return Err(Error::InvalidConfig("half_height must be finite and >= 0"));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1"));
        }
        if !(self.min_node_radius.is_finite() && self.min_node_radius >= 0.0) {
            return Err(Error::InvalidConfig(
                "min_node_radius must be finite and >= 0",
            ));
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(self.center, self.half_width, self.half_height)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub shape: Shape,
    pub overlapped: BTreeSet<ShapeId>,
    /// The node currently storing the shape.
    pub region: NodeId,
}

/// Owns every shape inserted into it and keeps the overlap relation between them up to date.
#[derive(Debug, Clone)]
pub struct QuadTree {
    config: Config,
    root: NodeId,
    nodes: Vec<Node>,
    vacant: Vec<NodeId>,
    entries: BTreeMap<ShapeId, Entry>,
    next_id: u64,
}

impl Default for QuadTree {
    fn default() -> Self {
        Self::with_valid_config(Config::default())
    }
}

impl QuadTree {
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: Config) -> Self {
        Self {
            config,
            root: NodeId(0),
            nodes: vec![Node::leaf(config.bounds(), None)],
            vacant: vec![],
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Drop every entry and start over with new bounds.
    pub fn reset(&mut self, config: Config) -> Result<(), Error> {
        config.validate()?;
        *self = Self {
            next_id: self.next_id,
            ..Self::with_valid_config(config)
        };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.nodes.clear();
        self.vacant.clear();
        self.root = self.alloc(Node::leaf(self.config.bounds(), None));
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bounds(&self) -> Rectangle {
        self.node(self.root).bounds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take ownership of `shape` and link it with every stored shape it overlaps.
    ///
    /// Returns `Err` if the center of the shape is outside of the tree, the shape is dropped in
    /// that case.
    pub fn insert(&mut self, shape: Shape) -> Result<ShapeId, Error> {
        let center = shape.center();
        if !self.bounds().contains(center) {
            return Err(Error::OutOfBounds(center));
        }
        if shape.extent() > self.config.min_node_radius {
            warn!(
                "shape extent {} exceeds min_node_radius {}, some overlaps may be missed",
                shape.extent(),
                self.config.min_node_radius
            );
        }

        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                shape,
                overlapped: BTreeSet::new(),
                region: self.root,
            },
        );
        if !self.push(self.root, id, center) {
            self.entries.remove(&id);
            return Err(Error::OutOfBounds(center));
        }
        self.update_overlap(self.root, id);
        Ok(id)
    }

    /// Unlink the shape from its peers and hand it back.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let center = self.entries.get(&id)?.shape.center();
        let erased = self.erase(self.root, id, center);
        debug_assert!(erased, "registered shape {:?} was not in the tree", id);
        self.entries.remove(&id).map(|entry| entry.shape)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.entries.get(&id).map(|entry| &entry.shape)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.entries.iter().map(|(id, entry)| (*id, &entry.shape))
    }

    /// Ids of the shapes overlapping `id`.
    pub fn overlaps(&self, id: ShapeId) -> Option<&BTreeSet<ShapeId>> {
        self.entries.get(&id).map(|entry| &entry.overlapped)
    }

    pub fn is_overlapping(&self, a: ShapeId, b: ShapeId) -> bool {
        self.overlaps(a)
            .map(|overlapped| overlapped.contains(&b))
            .unwrap_or(false)
    }

    /// The node currently storing `id`.
    pub fn region_of(&self, id: ShapeId) -> Option<NodeId> {
        self.entries.get(&id).map(|entry| entry.region)
    }

    /// Quadrants taken from the root down to the node storing `id`.
    pub fn path(&self, id: ShapeId) -> Option<Vec<Quadrant>> {
        let mut current = self.region_of(id)?;
        let mut path = Vec::new();
        while let Some(parent) = self.node(current).parent {
            let i = self
                .node(parent)
                .children()
                .iter()
                .position(|child| *child == current)?;
            path.push(Quadrant::ALL[i]);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Per node entry counts, for debugging.
    pub fn dump(&self) -> Dump<'_> {
        Dump { tree: self }
    }
}

/// Prints every node as `<label> : <entries held> (<entries in subtree>)`, one level of
/// indentation per depth.
#[derive(Debug, Clone, Copy)]
pub struct Dump<'a> {
    tree: &'a QuadTree,
}

impl<'a> Dump<'a> {
    fn write_node(
        &self,
        f: &mut fmt::Formatter,
        node: NodeId,
        label: &dyn fmt::Display,
        depth: usize,
    ) -> fmt::Result {
        let n = self.tree.node(node);
        for _ in 0..depth {
            f.write_str("\t")?;
        }
        writeln!(f, "{} : {} ({})", label, n.entries().len(), n.count)?;
        for (q, child) in Quadrant::ALL.iter().zip(n.children()) {
            self.write_node(f, child, q, depth + 1)?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Dump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_node(f, self.tree.root, &"root", 0)
    }
}
