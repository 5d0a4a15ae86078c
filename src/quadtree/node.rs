use super::QuadTree;
use crate::shape::{Boundary, Rectangle};
use crate::{Point, ShapeId};
use arrayvec::ArrayVec;
use log::{debug, trace};
use std::fmt;
use std::mem;

/// Index of a node in the tree's arena. Slots are recycled after a merge, don't hold on to one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Quadrant {
    LeftUp = 0,
    RightUp = 1,
    LeftDown = 2,
    RightDown = 3,
}

impl Quadrant {
    /// Routing order: the first quadrant that contains a point gets it.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::LeftUp,
        Quadrant::RightUp,
        Quadrant::LeftDown,
        Quadrant::RightDown,
    ];

    /// Which quarter of `bounds` this quadrant covers.
    pub fn bounds(self, bounds: &Rectangle) -> Rectangle {
        let half_width = bounds.half_width() / 2.0;
        let half_height = bounds.half_height() / 2.0;
        let [x, y] = *bounds.center();
        let center = match self {
            Quadrant::LeftUp => Point::new(x - half_width, y + half_height),
            Quadrant::RightUp => Point::new(x + half_width, y + half_height),
            Quadrant::LeftDown => Point::new(x - half_width, y - half_height),
            Quadrant::RightDown => Point::new(x + half_width, y - half_height),
        };
        Rectangle::new(center, half_width, half_height)
    }

    fn of(center: Point, point: Point) -> Self {
        let left = point[0] <= center[0];
        let up = point[1] >= center[1];
        match (left, up) {
            (true, true) => Quadrant::LeftUp,
            (false, true) => Quadrant::RightUp,
            (true, false) => Quadrant::LeftDown,
            (false, false) => Quadrant::RightDown,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Quadrant::LeftUp => "LU",
            Quadrant::RightUp => "RU",
            Quadrant::LeftDown => "LD",
            Quadrant::RightDown => "RD",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeState {
    /// Entries with their cached centers, in insertion order.
    Leaf(Vec<(ShapeId, Point)>),
    /// Children in `Quadrant::ALL` order.
    Split([NodeId; 4]),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub bounds: Rectangle,
    pub parent: Option<NodeId>,
    /// Number of entries in this subtree.
    pub count: usize,
    pub state: NodeState,
}

impl Node {
    pub fn leaf(bounds: Rectangle, parent: Option<NodeId>) -> Self {
        Self {
            bounds,
            parent,
            count: 0,
            state: NodeState::Leaf(Vec::new()),
        }
    }

    pub fn children(&self) -> ArrayVec<[NodeId; 4]> {
        match self.state {
            NodeState::Leaf(_) => ArrayVec::new(),
            NodeState::Split(children) => children.into(),
        }
    }

    pub fn entries(&self) -> &[(ShapeId, Point)] {
        match &self.state {
            NodeState::Leaf(items) => items.as_slice(),
            NodeState::Split(_) => &[],
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.state, NodeState::Split(_))
    }
}

impl QuadTree {
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.vacant.pop() {
            self.nodes[id.0] = node;
            return id;
        }
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn release(&mut self, id: NodeId) {
        let bounds = self.node(id).bounds;
        *self.node_mut(id) = Node::leaf(bounds, None);
        self.vacant.push(id);
    }

    /// Pick the child of `node` that receives `point`.
    pub(crate) fn route(&self, node: NodeId, children: &[NodeId; 4], point: Point) -> NodeId {
        children
            .iter()
            .copied()
            .find(|&child| self.node(child).bounds.contains(point))
            // rounding of the child bounds may leave a boundary point uncovered
            .unwrap_or_else(|| {
                children[Quadrant::of(self.node(node).bounds.center(), point) as usize]
            })
    }

    /// Returns `false` if `center` is outside of the node.
    pub(crate) fn push(&mut self, node: NodeId, id: ShapeId, center: Point) -> bool {
        if !self.node(node).bounds.contains(center) {
            return false;
        }
        self.place(node, id, center);
        true
    }

    /// Insert without checking the bounds of `node`, the caller already did.
    fn place(&mut self, node: NodeId, id: ShapeId, center: Point) {
        self.node_mut(node).count += 1;
        let len = match &mut self.nodes[node.0].state {
            NodeState::Split(children) => {
                let children = *children;
                let child = self.route(node, &children, center);
                self.place(child, id, center);
                return;
            }
            NodeState::Leaf(items) => {
                items.push((id, center));
                items.len()
            }
        };
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.region = node;
        }
        if len > self.config.capacity {
            self.split(node);
        }
    }

    fn split(&mut self, node: NodeId) {
        let bounds = self.node(node).bounds;
        let smallest = bounds.half_width().min(bounds.half_height()) / 2.0;
        if smallest <= self.config.min_node_radius {
            // soft capacity limit
            return;
        }

        let children = Quadrant::ALL.map(|q| self.alloc(Node::leaf(q.bounds(&bounds), Some(node))));
        let state = mem::replace(&mut self.node_mut(node).state, NodeState::Split(children));
        debug!(
            "split node {:?} {:?} holding {} entries",
            node,
            bounds,
            self.node(node).count
        );
        if let NodeState::Leaf(items) = state {
            for (id, center) in items {
                let child = self.route(node, &children, center);
                self.place(child, id, center);
            }
        }
    }

    /// Returns `false` if the shape was not found below `node`.
    pub(crate) fn erase(&mut self, node: NodeId, id: ShapeId, center: Point) -> bool {
        if !self.node(node).bounds.contains(center) {
            return false;
        }
        self.take(node, id, center)
    }

    /// Follow the same route `place` took, without checking the bounds on the way down.
    fn take(&mut self, node: NodeId, id: ShapeId, center: Point) -> bool {
        let removed = match self.node(node).state {
            NodeState::Split(children) => {
                let child = self.route(node, &children, center);
                self.take(child, id, center)
            }
            NodeState::Leaf(_) => self.erase_from_leaf(node, id),
        };
        if !removed {
            return false;
        }

        let capacity = self.config.capacity;
        let n = self.node_mut(node);
        n.count -= 1;
        if n.is_split() && n.count < capacity / 2 {
            self.merge(node);
        }
        true
    }

    fn erase_from_leaf(&mut self, node: NodeId, id: ShapeId) -> bool {
        let items = match &mut self.nodes[node.0].state {
            NodeState::Leaf(items) => items,
            NodeState::Split(_) => return false,
        };
        match items.iter().position(|(item, _)| *item == id) {
            Some(i) => {
                items.remove(i);
            }
            None => return false,
        }
        self.sever(id);
        true
    }

    /// Remove `id` from the overlap set of all of its peers.
    fn sever(&mut self, id: ShapeId) {
        let peers = match self.entries.get_mut(&id) {
            Some(entry) => mem::take(&mut entry.overlapped),
            None => return,
        };
        for peer in peers {
            if let Some(entry) = self.entries.get_mut(&peer) {
                entry.overlapped.remove(&id);
            }
        }
    }

    /// Turn a split node back into a leaf holding every entry of its subtree.
    fn merge(&mut self, node: NodeId) {
        let mut items = Vec::with_capacity(self.node(node).count);
        let state = mem::replace(&mut self.node_mut(node).state, NodeState::Leaf(Vec::new()));
        if let NodeState::Split(children) = state {
            for child in children.iter().copied() {
                self.drain(child, &mut items);
            }
        }
        for (id, _) in items.iter() {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.region = node;
            }
        }
        debug!("merged node {:?} back into a leaf of {} entries", node, items.len());
        self.node_mut(node).state = NodeState::Leaf(items);
    }

    fn drain(&mut self, node: NodeId, out: &mut Vec<(ShapeId, Point)>) {
        let state = mem::replace(&mut self.node_mut(node).state, NodeState::Leaf(Vec::new()));
        match state {
            NodeState::Leaf(items) => out.extend(items),
            NodeState::Split(children) => {
                for child in children.iter().copied() {
                    self.drain(child, out);
                }
            }
        }
        self.release(node);
    }

    /// Link `id` with every shape below `node` it overlaps.
    ///
    /// Nodes further than `min_node_radius` from the shape are skipped: every entry of a node has
    /// its center inside of it (up to the rounding gaps `route` falls back on), and no entry is
    /// expected to be larger than that.
    /// Overlapping a child implies overlapping the parent, so the pruning applies at every level.
    pub(crate) fn update_overlap(&mut self, node: NodeId, id: ShapeId) {
        let shape = match self.entries.get(&id) {
            Some(entry) => entry.shape,
            None => return,
        };
        let n = self.node(node);
        if !shape.is_overlap(&n.bounds, self.config.min_node_radius) {
            return;
        }
        if n.is_split() {
            for child in n.children() {
                self.update_overlap(child, id);
            }
            return;
        }

        let peers = n
            .entries()
            .iter()
            .map(|(other, _)| *other)
            .filter(|other| *other != id)
            .filter(|other| {
                self.entries
                    .get(other)
                    .map(|entry| shape.is_overlap(&entry.shape, 0.0))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();
        for peer in peers {
            trace!("{:?} overlaps {:?}", id, peer);
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.overlapped.insert(peer);
            }
            if let Some(entry) = self.entries.get_mut(&peer) {
                entry.overlapped.insert(id);
            }
        }
    }
}
