use std::fmt::{Debug, Display};

use thiserror::Error;

use super::{EdgeLength, NodeId};

/// Errors that can occur when manipulating [`Node`] structs.
#[derive(Error, Debug)]
pub enum NodeError {
    /// We are trying to access the an unexisting child of the node
    #[error("Node {parent} does not have child {child}.")]
    HasNoChild {
        /// Id of the parent the parent node
        parent: NodeId,
        /// Id of the inexistant child node
        child: NodeId,
    },
    /// We are trying to access the parent of a parentless node
    #[error("Node {0} does not have a parent")]
    HasNoParent(NodeId),
}

#[derive(Clone)]
/// A node of the Tree
pub struct Node {
    /// Index of the node
    pub id: NodeId,
    /// Name of the node, empty for unnamed nodes
    pub name: String,
    /// Length of the branch between this node and its parent (0 for the root)
    pub distance: EdgeLength,
    /// Whether this subtree is drawn as a single collapsed clade
    pub collapsed: bool,
    /// Set on the node that was used as outgroup when rerooting
    pub outgroup: bool,
    /// Horizontal layout coordinate, see [`Tree::compute_layout`](super::Tree::compute_layout)
    pub x: f64,
    /// Vertical layout coordinate, see [`Tree::compute_layout`](super::Tree::compute_layout)
    pub y: f64,
    /// Index of the parent node
    pub(crate) parent: Option<NodeId>,
    /// Indices of child nodes
    pub(crate) children: Vec<NodeId>,
    // Whether the node is deleted or not
    pub(crate) deleted: bool,
}

impl Node {
    /// Creates a new Node
    pub fn new() -> Self {
        Self {
            id: 0,
            name: String::new(),
            distance: 0.0,
            collapsed: false,
            outgroup: false,
            x: 0.0,
            y: 0.0,
            parent: None,
            children: vec![],
            deleted: false,
        }
    }

    /// Creates a new named Node
    pub fn new_named(name: &str) -> Self {
        Self {
            name: String::from(name),
            ..Self::new()
        }
    }

    /// Sets the Node name
    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Sets the internal Node id
    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    /// Set the parent node
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Index of the parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Indices of the child nodes, in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Empties the node and sets it as deleted
    pub(crate) fn delete(&mut self) {
        *self = Self::new();
        self.deleted = true;
    }

    /// Appends a child index to the node.
    /// The child's parent must be set by the caller, see [`Tree::add_child`](super::Tree::add_child).
    pub(crate) fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    /// Removes the child from the node
    pub(crate) fn remove_child(&mut self, child: &NodeId) -> Result<(), NodeError> {
        let vec_index = self.child_position(child)?;
        self.children.remove(vec_index);

        Ok(())
    }

    /// Puts `new` in place of `old` in the child list, keeping its position
    pub(crate) fn replace_child(&mut self, old: &NodeId, new: NodeId) -> Result<(), NodeError> {
        let vec_index = self.child_position(old)?;
        self.children[vec_index] = new;

        Ok(())
    }

    fn child_position(&self, child: &NodeId) -> Result<usize, NodeError> {
        self.children
            .iter()
            .position(|node_id| node_id == child)
            .ok_or(NodeError::HasNoChild {
                parent: self.id,
                child: *child,
            })
    }

    /// Check if the node is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if the node is a root node
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.parent {
            Some(_) => write!(f, "({:.3}) {:?}", self.distance, self.name),
            None => write!(f, "{:?}", self.name),
        }
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}) {:?} Id[{}] Parent[{:?}] Collapsed[{}] Outgroup[{}] XY[{}, {}] Children({:?})",
            self.distance,
            self.name,
            self.id,
            self.parent,
            self.collapsed,
            self.outgroup,
            self.x,
            self.y,
            self.children,
        )
    }
}
