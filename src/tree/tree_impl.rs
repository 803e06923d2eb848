use log::debug;
use ptree::{print_tree, TreeBuilder};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::iter::zip;
use std::{
    fmt::Display,
    fs::File,
    io::{BufReader, BufWriter, Read},
    path::Path,
};

use thiserror::Error;

use super::draw::PaintMode;
use super::newick::{self, NewickParseError, NewickReader, NewickWriter};
use super::node::{Node, NodeError};
use super::{EdgeLength, NodeId};

/// Two branch lengths closer than this are considered equal when comparing trees
pub const DISTANCE_TOLERANCE: EdgeLength = 1e-9;

/// Errors that can occur when reading, writing and manipulating [`Tree`] structs.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The requested node with index [`NodeId`] does not exist in the tree
    #[error("There is no node with index: {0}")]
    NodeNotFound(NodeId),
    /// No descendant of the root carries the requested name
    #[error("There is no node named: {0:?}")]
    NameNotFound(String),
    /// The root has no parent edge to split, so it cannot be an outgroup
    #[error("Cannot reroot on node {0}, it is already the root")]
    RerootAtRoot(NodeId),
    /// A tree needs at least two leaves
    #[error("Cannot build a tree with {0} leaves, at least 2 are needed")]
    NotEnoughLeaves(usize),
    /// There was a [`std::io::Error`] when writing the tree
    #[error("Error writing tree")]
    IoError(#[from] std::io::Error),
    /// There was a [`NodeError`] when operating on a node
    #[error("Could not operate on Node")]
    NodeError(#[from] NodeError),
}

/// A Phylogenetic tree
///
/// Nodes live in an arena and refer to each other through [`NodeId`] handles.
/// Removed nodes stay in the arena as deleted slots and can no longer be
/// accessed with [`Tree::get`].
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

/// Base methods to add and get [`Node`] objects to and from the [`Tree`].
///
/// ----
/// ----
impl Tree {
    /// Create a new Tree holding a single childless root.
    /// The tree is not [valid](Tree::is_valid) until children are added.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
            root: 0,
        }
    }

    // ############################
    // # ADDING AND GETTING NODES #
    // ############################

    /// Add a new, unattached node to the tree.
    pub fn add(&mut self, node: Node) -> NodeId {
        let idx = self.nodes.len();
        let mut node = node;
        node.set_id(idx);
        self.nodes.push(node);

        idx
    }

    /// Add a child to one of the tree's nodes.
    ///
    /// # Example
    /// ```
    /// use ecotree::tree::{Tree, Node};
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.get_root();
    ///
    /// let left = tree.add_child(Node::new_named("A"), root, 0.1).unwrap();
    /// let right = tree.add_child(Node::new_named("B"), root, 0.2).unwrap();
    ///
    /// assert_eq!(tree.root().children(), &[left, right]);
    /// assert_eq!(tree.get(&right).unwrap().parent(), Some(root));
    /// assert_eq!(tree.get(&right).unwrap().distance, 0.2);
    /// ```
    pub fn add_child(
        &mut self,
        node: Node,
        parent: NodeId,
        distance: EdgeLength,
    ) -> Result<NodeId, TreeError> {
        self.get(&parent)?;

        let mut node = node;
        node.distance = distance;
        let id = self.add(node);
        self.attach(id, parent)?;

        Ok(id)
    }

    /// Get a reference to a specific Node of the tree
    pub fn get(&self, id: &NodeId) -> Result<&Node, TreeError> {
        match self.nodes.get(*id) {
            Some(node) if !node.deleted => Ok(node),
            _ => Err(TreeError::NodeNotFound(*id)),
        }
    }

    /// Get a mutable reference to a specific Node of the tree
    pub fn get_mut(&mut self, id: &NodeId) -> Result<&mut Node, TreeError> {
        match self.nodes.get_mut(*id) {
            Some(node) if !node.deleted => Ok(node),
            _ => Err(TreeError::NodeNotFound(*id)),
        }
    }

    /// Gets the index of the root node.
    pub fn get_root(&self) -> NodeId {
        self.root
    }

    /// Gets a reference to the root node.
    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    /// Get the first descendant of the root (in preorder) whose name is exactly `name`.
    /// Returns `None` if there is no such descendant.
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5):0.6);").unwrap();
    /// let ab = tree.get_descendant("AB").unwrap();
    ///
    /// assert_eq!(tree.get(&ab).unwrap().children().len(), 2);
    /// assert_eq!(tree.get_descendant("a"), None);
    /// ```
    pub fn get_descendant(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.root().children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }

        None
    }

    /// Same as [`Tree::get_descendant`] but fails with [`TreeError::NameNotFound`]
    fn find_descendant(&self, name: &str) -> Result<NodeId, TreeError> {
        self.get_descendant(name)
            .ok_or_else(|| TreeError::NameNotFound(name.to_string()))
    }

    /// Search the nodes reachable from the root with a closure, in preorder.
    pub fn search_nodes(&self, cond: impl Fn(&Node) -> bool) -> Result<Vec<NodeId>, TreeError> {
        let mut found = vec![];
        for id in self.preorder(&self.root)? {
            if cond(self.get(&id)?) {
                found.push(id);
            }
        }

        Ok(found)
    }

    /// Returns the ids of the leaves of the tree, in preorder
    pub fn get_leaves(&self) -> Result<Vec<NodeId>, TreeError> {
        self.search_nodes(|node| node.is_leaf())
    }

    /// Returns the names of the leaves of the tree, in preorder
    pub fn get_leaf_names(&self) -> Result<Vec<String>, TreeError> {
        self.get_leaves()?
            .iter()
            .map(|id| Ok(self.get(id)?.name.clone()))
            .collect()
    }

    /// Gets the node ids of all the nodes in the subtree rooted at the specified node
    pub fn get_subtree(&self, root: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        self.preorder(root)
    }

    /// Gets the node ids of all the nodes in the subtree rooted at the specified node, except the root
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;").unwrap();
    /// let sub_root = tree.get_descendant("E").unwrap();
    /// let names: Vec<_> = tree.get_descendants(&sub_root)
    ///     .unwrap()
    ///     .iter()
    ///     .map(|id| tree.get(id).unwrap().name.clone())
    ///     .collect();
    ///
    /// assert_eq!(names, vec!["C", "D"])
    /// ```
    pub fn get_descendants(&self, root: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut indices = self.preorder(root)?;
        indices.remove(0);

        Ok(indices)
    }

    /// Gets the descendants of a node that are flagged as collapsed, in preorder
    pub fn get_collapsed(&self, root: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut collapsed = vec![];
        for id in self.get_descendants(root)? {
            if self.get(&id)?.collapsed {
                collapsed.push(id);
            }
        }

        Ok(collapsed)
    }

    /// All descendants of the root, in preorder
    pub fn descendants(&self) -> Result<Vec<NodeId>, TreeError> {
        self.get_descendants(&self.root)
    }

    /// All collapsed descendants of the root, in preorder
    pub fn collapsed(&self) -> Result<Vec<NodeId>, TreeError> {
        self.get_collapsed(&self.root)
    }
}

impl Tree {
    // ###################
    // # TREE TRAVERSALS #
    // ###################

    /// Returns a vector containing node ids in the same order as the
    /// [preorder](https://en.wikipedia.org/wiki/Tree_traversal#Pre-order,_NLR) tree traversal
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A,(C,E)D)B,(H,J)G)F;").unwrap();
    /// let preorder: Vec<_> = tree.preorder(&tree.get_root())
    ///     .unwrap()
    ///     .iter()
    ///     .map(|id| tree.get(id).unwrap().name.clone())
    ///     .collect();
    ///
    /// assert_eq!(preorder, vec!["F", "B", "A", "D", "C", "E", "G", "H", "J"])
    /// ```
    pub fn preorder(&self, root: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut indices = vec![];
        let mut stack = vec![*root];
        while let Some(id) = stack.pop() {
            indices.push(id);
            stack.extend(self.get(&id)?.children.iter().rev());
        }

        Ok(indices)
    }

    /// Returns a vector containing node ids in the same order as the
    /// [postorder](https://en.wikipedia.org/wiki/Tree_traversal#Post-order,_LRN ) tree traversal
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A,(C,E)D)B,(H,J)G)F;").unwrap();
    /// let postorder: Vec<_> = tree.postorder(&tree.get_root())
    ///     .unwrap()
    ///     .iter()
    ///     .map(|id| tree.get(id).unwrap().name.clone())
    ///     .collect();
    ///
    /// assert_eq!(postorder, vec!["A", "C", "E", "D", "B", "H", "J", "G", "F"])
    /// ```
    pub fn postorder(&self, root: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        // Mirrored preorder (node, right, left) read backwards
        let mut indices = vec![];
        let mut stack = vec![*root];
        while let Some(id) = stack.pop() {
            indices.push(id);
            stack.extend(self.get(&id)?.children.iter());
        }
        indices.reverse();

        Ok(indices)
    }
}

/// Methods that compute characteristics and measures to describe the [`Tree`]
///
/// ----
/// ----
impl Tree {
    // #######################################
    // # GETTING CHARACTERISTICS OF THE TREE #
    // #######################################

    /// A tree is valid once its root has at least one descendant
    pub fn is_valid(&self) -> bool {
        !self.root().children.is_empty()
    }

    /// Returns the number of leaves in the tree
    pub fn n_leaves(&self) -> Result<usize, TreeError> {
        Ok(self.get_leaves()?.len())
    }

    /// Number of living descendants of a node: leaves, with collapsed
    /// subtrees counting as a single descendant in [`PaintMode::Collapsed`].
    pub fn n_descendants(&self, id: &NodeId, mode: PaintMode) -> Result<usize, TreeError> {
        let mut count = 0;
        let mut stack = self.get(id)?.children.clone();
        while let Some(child) = stack.pop() {
            let child = self.get(&child)?;
            if mode.is_atom(child) {
                count += 1;
            } else {
                stack.extend(child.children.iter());
            }
        }

        Ok(count)
    }

    /// Number of living descendants of the root, see [`Tree::n_descendants`]
    /// ```
    /// use ecotree::tree::{PaintMode, Tree};
    ///
    /// let mut tree = Tree::from_newick("((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5):0.6);").unwrap();
    /// let ab = tree.get_descendant("AB").unwrap();
    /// tree.get_mut(&ab).unwrap().collapsed = true;
    ///
    /// assert_eq!(tree.size(PaintMode::Normal).unwrap(), 4);
    /// assert_eq!(tree.size(PaintMode::Collapsed).unwrap(), 3);
    /// ```
    pub fn size(&self, mode: PaintMode) -> Result<usize, TreeError> {
        self.n_descendants(&self.root, mode)
    }

    /// Largest sum of branch lengths on a path from the node down to one of its leaves.
    /// This is 0 for a leaf.
    pub fn max_distance_to_leaf(&self, id: &NodeId) -> Result<EdgeLength, TreeError> {
        let order = self.postorder(id)?;
        let mut furthest: HashMap<NodeId, EdgeLength> = HashMap::with_capacity(order.len());
        for v in order {
            let mut best: EdgeLength = 0.0;
            for child in self.get(&v)?.children.iter() {
                let below = furthest.get(child).copied().unwrap_or_default();
                best = best.max(below + self.get(child)?.distance);
            }
            furthest.insert(v, best);
        }

        Ok(furthest.get(id).copied().unwrap_or_default())
    }

    /// Distance from the root to the most divergent leaf
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.5);").unwrap();
    /// assert_eq!(tree.maximum_width().unwrap(), 1.0);
    /// ```
    pub fn maximum_width(&self) -> Result<EdgeLength, TreeError> {
        self.max_distance_to_leaf(&self.root)
    }

    /// Largest X coordinate of the layout, equal to [`Tree::maximum_width`]
    pub fn maximum_x(&self) -> Result<EdgeLength, TreeError> {
        self.maximum_width()
    }

    /// Largest Y coordinate of the layout, i.e. [`Tree::size`] as a real number
    pub fn maximum_y(&self, mode: PaintMode) -> Result<f64, TreeError> {
        Ok(self.size(mode)? as f64)
    }

    /// Returns the path from the root to the node, both included
    pub fn get_path_from_root(&self, node: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = vec![*node];
        let mut current = *node;
        while let Some(parent) = self.get(&current)?.parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();

        Ok(path)
    }

    /// Gets the most recent common ancestor of two nodes
    pub fn get_common_ancestor(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<NodeId, TreeError> {
        let root_to_source = self.get_path_from_root(source)?;
        let root_to_target = self.get_path_from_root(target)?;

        let ancestor = zip(root_to_source.iter(), root_to_target.iter())
            .take_while(|(s, t)| s == t)
            .map(|(s, _)| *s)
            .last()
            .unwrap_or(self.root);

        Ok(ancestor)
    }

    /// Sum of the branch lengths between the root and a node
    pub fn distance_from_root(&self, node: &NodeId) -> Result<EdgeLength, TreeError> {
        self.distance_to_ancestor(node, &self.root)
    }

    fn distance_to_ancestor(
        &self,
        node: &NodeId,
        ancestor: &NodeId,
    ) -> Result<EdgeLength, TreeError> {
        let mut distance = 0.0;
        let mut current = *node;
        while current != *ancestor {
            let n = self.get(&current)?;
            distance += n.distance;
            current = n.parent.ok_or(NodeError::HasNoParent(current))?;
        }

        Ok(distance)
    }

    /// Sum of the branch lengths on the path between two nodes
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A:0.25,B:0.5):0.5,(C:0.25,D:1):1);").unwrap();
    /// let a = tree.get_descendant("A").unwrap();
    /// let d = tree.get_descendant("D").unwrap();
    ///
    /// assert_eq!(tree.get_distance(&a, &d).unwrap(), 2.75);
    /// ```
    pub fn get_distance(&self, source: &NodeId, target: &NodeId) -> Result<EdgeLength, TreeError> {
        let ancestor = self.get_common_ancestor(source, target)?;

        Ok(self.distance_to_ancestor(source, &ancestor)?
            + self.distance_to_ancestor(target, &ancestor)?)
    }

    /// Compares the subtree rooted at `id` with the subtree of `other` rooted at `other_id`.
    ///
    /// Nodes are compared in preorder on their name, branch length and number of
    /// children. Returns [`Ordering::Equal`] when both subtrees have the same topology,
    /// names and branch lengths (up to [`DISTANCE_TOLERANCE`]). The branch lengths of
    /// the two compared subtree roots are ignored.
    pub fn compare_subtrees(
        &self,
        id: &NodeId,
        other: &Tree,
        other_id: &NodeId,
    ) -> Result<Ordering, TreeError> {
        let mut stack = vec![(*id, *other_id, true)];
        while let Some((a, b, is_top)) = stack.pop() {
            let (na, nb) = (self.get(&a)?, other.get(&b)?);

            let ordering = na
                .name
                .cmp(&nb.name)
                .then_with(|| {
                    if is_top {
                        Ordering::Equal
                    } else {
                        compare_distances(na.distance, nb.distance)
                    }
                })
                .then_with(|| na.children.len().cmp(&nb.children.len()));

            if ordering != Ordering::Equal {
                return Ok(ordering);
            }

            for (ca, cb) in zip(na.children.iter(), nb.children.iter()).rev() {
                stack.push((*ca, *cb, false));
            }
        }

        Ok(Ordering::Equal)
    }

    /// Compares two whole trees, see [`Tree::compare_subtrees`]
    pub fn compare(&self, other: &Tree) -> Result<Ordering, TreeError> {
        self.compare_subtrees(&self.root, other, &other.root)
    }
}

fn compare_distances(a: EdgeLength, b: EdgeLength) -> Ordering {
    if (a - b).abs() <= DISTANCE_TOLERANCE {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Methods to modify the structure of the [`Tree`]
///
/// ----
/// ----
impl Tree {
    // ##################
    // # ALTER THE TREE #
    // ##################

    /// Detaches a node from its parent, the node becomes parentless
    pub(crate) fn detach(&mut self, id: &NodeId) -> Result<(), TreeError> {
        if let Some(parent) = self.get(id)?.parent {
            self.get_mut(&parent)?.remove_child(id)?;
            self.get_mut(id)?.set_parent(None);
        }

        Ok(())
    }

    /// Appends `child` to the children of `parent`
    pub(crate) fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), TreeError> {
        self.get_mut(&child)?.set_parent(Some(parent));
        self.get_mut(&parent)?.add_child(child);

        Ok(())
    }

    /// Removes a leaf from the tree.
    ///
    /// If its parent is left with a single child, the parent is removed as well:
    /// the remaining child takes the parent's place among the grandparent's children
    /// and its branch length becomes the sum of its own and the parent's. When the
    /// parent was the root, the remaining child becomes the new root.
    ///
    /// Nothing happens if the node is not a leaf or is the root itself.
    /// # Example
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let mut tree = Tree::from_newick("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);").unwrap();
    /// let a = tree.get_descendant("A").unwrap();
    /// tree.remove_descendant(&a).unwrap();
    ///
    /// assert_eq!(tree.to_newick().unwrap(), "(B:0.5,(C:0.4,D:0.5):0.6);");
    /// ```
    pub fn remove_descendant(&mut self, id: &NodeId) -> Result<(), TreeError> {
        let node = self.get(id)?;
        if !node.is_leaf() {
            debug!("Not removing internal node {id} ({:?})", node.name);
            return Ok(());
        }
        let Some(parent) = node.parent else {
            return Ok(());
        };

        debug!("Removing leaf {id} ({:?})", node.name);
        self.detach(id)?;
        self.get_mut(id)?.delete();

        let parent_node = self.get(&parent)?;
        if parent_node.children.len() != 1 {
            return Ok(());
        }

        // The parent is left with a single child: contract it
        let sibling = parent_node.children[0];
        let parent_distance = parent_node.distance;
        let grandparent = parent_node.parent;

        self.get_mut(&sibling)?.distance += parent_distance;
        match grandparent {
            None => {
                debug!("Node {sibling} becomes the new root");
                self.get_mut(&sibling)?.set_parent(None);
                self.root = sibling;
            }
            Some(grandparent) => {
                debug!("Contracting node {parent} into node {sibling}");
                self.get_mut(&grandparent)?
                    .replace_child(&parent, sibling)?;
                self.get_mut(&sibling)?.set_parent(Some(grandparent));
            }
        }
        self.get_mut(&parent)?.delete();

        Ok(())
    }

    /// Removes the first descendant named `name`, see [`Tree::remove_descendant`]
    pub fn remove_descendant_by_name(&mut self, name: &str) -> Result<(), TreeError> {
        let id = self.find_descendant(name)?;
        self.remove_descendant(&id)
    }

    /// Reroots the tree so that `outgroup` becomes a child of a new root.
    ///
    /// The branch above the outgroup is split in two equal halves, one leading to
    /// the outgroup and one leading to its former parent. Every node on the path
    /// between the former parent and the old root is turned around so that it hangs
    /// from the node that used to be its child, taking that node's former branch length.
    /// The old root is removed and its remaining children are attached to the last
    /// node of that path, their branch lengths extended by the length of the branch
    /// that led to the old root. The outgroup is flagged with [`Node::outgroup`].
    ///
    /// Leaf to leaf distances are left unchanged.
    /// # Example
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let mut tree = Tree::from_newick("((A:1,B:1):2,(C:4,D:1):2);").unwrap();
    /// let c = tree.get_descendant("C").unwrap();
    /// tree.reroot(&c).unwrap();
    ///
    /// assert_eq!(tree.to_newick().unwrap(), "(C:2,(D:1,(A:1,B:1):4):2);");
    /// assert!(tree.get(&c).unwrap().outgroup);
    /// ```
    pub fn reroot(&mut self, outgroup: &NodeId) -> Result<(), TreeError> {
        let old_root = self.root;
        let mut old_parent = self
            .get(outgroup)?
            .parent
            .ok_or(TreeError::RerootAtRoot(*outgroup))?;

        debug!(
            "Rerooting on node {outgroup} ({:?})",
            self.get(outgroup)?.name
        );

        let new_root = self.add(Node::new());
        self.detach(outgroup)?;
        self.attach(*outgroup, new_root)?;

        // Split the outgroup branch
        let mut distance = self.get(outgroup)?.distance * 0.5;
        let mut old_distance = self.get(&old_parent)?.distance;
        {
            let node = self.get_mut(outgroup)?;
            node.distance = distance;
            node.outgroup = true;
        }
        self.get_mut(&old_parent)?.distance = distance;

        // Turn the path to the old root around
        let mut new_parent = new_root;
        while old_parent != old_root {
            let node = old_parent;
            old_parent = self
                .get(&node)?
                .parent
                .ok_or(NodeError::HasNoParent(node))?;
            self.detach(&node)?;
            self.attach(node, new_parent)?;
            new_parent = node;
            self.get_mut(&node)?.distance = distance;
            distance = old_distance;
            old_distance = self.get(&old_parent)?.distance;
        }

        // Hand the old root's remaining children over to the end of the path
        let remaining = std::mem::take(&mut self.get_mut(&old_root)?.children);
        for child in remaining {
            self.attach(child, new_parent)?;
            self.get_mut(&child)?.distance += distance;
        }
        self.get_mut(&old_root)?.delete();
        self.root = new_root;

        Ok(())
    }

    /// Reroots on the first descendant named `name`, see [`Tree::reroot`]
    pub fn reroot_by_name(&mut self, name: &str) -> Result<(), TreeError> {
        let id = self.find_descendant(name)?;
        self.reroot(&id)
    }
}

/// Methods to read and write [`Tree`] objects to and from files or [`String`] objects.
///
/// ----
/// ----
impl Tree {
    // ########################
    // # READ AND WRITE TREES #
    // ########################

    /// Read a newick formatted string and build a [`Tree`] struct from it.
    /// # Example
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);").unwrap();
    ///
    /// assert_eq!(tree.root().children().len(), 2);
    /// assert_eq!(tree.get_leaf_names().unwrap(), vec!["A", "B", "C", "D"]);
    /// assert!(Tree::from_newick("(A);").is_err());
    /// ```
    pub fn from_newick(newick: &str) -> Result<Self, NewickParseError> {
        NewickReader::new(newick.as_bytes()).read_tree()
    }

    /// Reads a newick formatted tree from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, NewickParseError> {
        NewickReader::new(reader).read_tree()
    }

    /// Creates a tree from a newick file
    pub fn from_file(path: &Path) -> Result<Self, NewickParseError> {
        let file = File::open(path)?;
        NewickReader::new(BufReader::new(file)).read_tree()
    }

    /// Writes the tree as a newick formatted string
    pub fn to_newick(&self) -> Result<String, TreeError> {
        Ok(newick::format_subtree(self, &self.root)? + ";")
    }

    /// Writes the subtree rooted at a node as a newick formatted string,
    /// without the closing semicolon
    /// ```
    /// use ecotree::tree::Tree;
    ///
    /// let tree = Tree::from_newick("((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5):0.6);").unwrap();
    /// let ab = tree.get_descendant("AB").unwrap();
    ///
    /// assert_eq!(tree.subtree_to_newick(&ab).unwrap(), "(A:0.1,B:0.2)AB:0.3");
    /// ```
    pub fn subtree_to_newick(&self, id: &NodeId) -> Result<String, TreeError> {
        newick::format_subtree(self, id)
    }

    /// Writes the tree to a newick file
    pub fn to_file(&self, path: &Path) -> Result<(), TreeError> {
        let file = File::create(path)?;
        NewickWriter::new(BufWriter::new(file)).write_tree(self)
    }

    /// Print the tree to the console
    pub fn print(&self) -> Result<(), TreeError> {
        enum Step {
            Enter(NodeId),
            Exit,
        }

        let mut builder = TreeBuilder::new(format!("{}", self.root()));
        let mut stack: Vec<_> = self
            .root()
            .children
            .iter()
            .rev()
            .map(|id| Step::Enter(*id))
            .collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Exit => {
                    builder.end_child();
                }
                Step::Enter(id) => {
                    let node = self.get(&id)?;
                    if node.is_leaf() {
                        builder.add_empty_child(format!("{node}"));
                    } else {
                        builder.begin_child(format!("{node}"));
                        stack.push(Step::Exit);
                        stack.extend(node.children.iter().rev().map(|id| Step::Enter(*id)));
                    }
                }
            }
        }

        print_tree(&builder.build())?;
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let newick = self.to_newick().map_err(|_| std::fmt::Error)?;
        write!(f, "{newick}")
    }
}
