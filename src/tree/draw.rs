//! Lay out trees as cladograms and paint them through a [`Painter`].
//!
//! The layout gives every node an `x` coordinate equal to its distance from
//! the root and a `y` coordinate in leaf slots: leaves take consecutive
//! integer slots from top to bottom and internal nodes sit halfway between
//! their first and last child. The paint driver turns these coordinates into
//! pixels and issues the drawing calls.
//!
//! ```
//! use ecotree::tree::{PaintMode, Tree};
//!
//! let mut tree = Tree::from_newick("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);").unwrap();
//! tree.compute_layout(PaintMode::Normal).unwrap();
//!
//! let ys: Vec<_> = tree.get_leaves().unwrap().iter().map(|id| tree.get(id).unwrap().y).collect();
//! assert_eq!(ys, vec![0., 1., 2., 3.]);
//! assert_eq!(tree.root().y, 1.5);
//! ```
use clap::ValueEnum;
use itertools::Itertools;
use log::{debug, trace, warn};
use thiserror::Error;

use super::node::Node;
use super::tree_impl::{Tree, TreeError};
use super::NodeId;

/// Pixels per unit of branch length
pub const X_MODIFIER: f64 = 1000.0;
/// Stroke width of branches
pub const STROKE: i32 = 1;
/// Stroke width of demarcation bars
pub const DEMARCATION_STROKE: i32 = 10;
/// Extra canvas width reserved for demarcation bars
pub const DEMARCATION_PADDING: i32 = 20;
/// Gap between the widest label of the tree and the demarcation bars
pub const DEMARCATION_OFFSET: i32 = 10;
/// Minimum width of a collapsed triangle, in branch length units
pub const MIN_COLLAPSED_WIDTH: f64 = 0.01;

/// Ways to present the collapsed subtrees of a tree
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PaintMode {
    /// Collapsed flags are ignored
    #[default]
    Normal,
    /// Collapsed subtrees are drawn as labelled triangles
    Collapsed,
    /// The whole tree is drawn, collapsed subtrees are marked by a bar in the right margin
    Demarcated,
}

impl PaintMode {
    /// Nodes laid out in a single Y slot: leaves, and collapsed nodes in [`PaintMode::Collapsed`]
    pub(crate) fn is_atom(self, node: &Node) -> bool {
        node.is_leaf() || (self == PaintMode::Collapsed && node.collapsed)
    }
}

/// A drawing surface with integer pixel coordinates.
///
/// The origin is the top left corner of the canvas. [`Tree::paint_tree`]
/// calls [`Painter::start`] once, then the drawing methods, then [`Painter::end`].
pub trait Painter {
    /// Error returned by the drawing methods
    type Error: std::error::Error + 'static;

    /// Width of a character, in pixels
    fn font_width(&self) -> i32;
    /// Height of a character, in pixels
    fn font_height(&self) -> i32;
    /// Prepares a canvas of the given size
    fn start(&mut self, width: i32, height: i32) -> Result<(), Self::Error>;
    /// Draws a string whose baseline starts at (`x`, `y`)
    fn draw_string(&mut self, text: &str, x: i32, y: i32) -> Result<(), Self::Error>;
    /// Draws a line between two points
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, stroke: i32)
        -> Result<(), Self::Error>;
    /// Finishes the drawing
    fn end(&mut self) -> Result<(), Self::Error>;
}

/// Errors that can occur when painting a tree
#[derive(Error, Debug)]
pub enum PaintError<E: std::error::Error + 'static> {
    /// The painter failed, [`Painter::end`] has already been called
    #[error("The painter failed")]
    Painter(#[source] E),
    /// The tree could not be laid out
    #[error("Could not lay out the tree")]
    Tree(#[from] TreeError),
}

/// Calls [`Painter::end`] when dropped unless the drawing was finished
struct PaintSession<'a, P: Painter> {
    painter: &'a mut P,
    finished: bool,
}

impl<'a, P: Painter> PaintSession<'a, P> {
    fn start(painter: &'a mut P, width: i32, height: i32) -> Result<Self, P::Error> {
        painter.start(width, height)?;
        Ok(Self {
            painter,
            finished: false,
        })
    }

    fn finish(mut self) -> Result<(), P::Error> {
        self.finished = true;
        self.painter.end()
    }
}

impl<P: Painter> Drop for PaintSession<'_, P> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.painter.end() {
                warn!("Could not end interrupted drawing: {e}");
            }
        }
    }
}

/// Converts layout coordinates to pixels
#[derive(Debug, Clone, Copy)]
struct Geometry {
    font_width: i32,
    font_height: i32,
    x_spacer: i32,
    y_spacer: i32,
}

impl Geometry {
    fn new<P: Painter>(painter: &P) -> Self {
        let (font_width, font_height) = (painter.font_width(), painter.font_height());
        Self {
            font_width,
            font_height,
            x_spacer: font_width / 2,
            y_spacer: font_height / 2,
        }
    }

    fn x(&self, node: &Node) -> i32 {
        self.font_width + (node.x * X_MODIFIER).round() as i32
    }

    fn y(&self, node: &Node) -> i32 {
        self.font_height + (node.y * f64::from(self.font_height)).round() as i32
    }

    fn label_width(&self, label: &str) -> i32 {
        (label.chars().count() as i32 + 1) * self.font_width
    }
}

/// Layout and painting
impl Tree {
    /// Nodes reached by the layout in preorder, collapsed subtrees are
    /// not entered in [`PaintMode::Collapsed`]
    fn layout_order(&self, mode: PaintMode) -> Result<Vec<NodeId>, TreeError> {
        let mut order = vec![];
        let mut stack = vec![self.get_root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = self.get(&id)?;
            if !mode.is_atom(node) {
                stack.extend(node.children().iter().rev());
            }
        }

        Ok(order)
    }

    /// Computes the `x` and `y` coordinates of the nodes, see [`Tree::compute_layout_from`]
    pub fn compute_layout(&mut self, mode: PaintMode) -> Result<(), TreeError> {
        self.compute_layout_from(mode, 0.0)
    }

    /// Computes the `x` and `y` coordinates of the nodes, the first leaf slot being `height`.
    ///
    /// In [`PaintMode::Collapsed`] a collapsed node takes a single slot, is pushed to the
    /// right by the depth of its subtree (at least [`MIN_COLLAPSED_WIDTH`]) and its
    /// descendants keep their previous coordinates.
    /// ```
    /// use ecotree::tree::{PaintMode, Tree};
    ///
    /// let mut tree = Tree::from_newick("((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5):0.6);").unwrap();
    /// let ab = tree.get_descendant("AB").unwrap();
    /// tree.get_mut(&ab).unwrap().collapsed = true;
    ///
    /// tree.compute_layout_from(PaintMode::Collapsed, 2.0).unwrap();
    ///
    /// let ab = tree.get(&ab).unwrap();
    /// assert_eq!((ab.x, ab.y), (0.5, 2.0));
    /// assert_eq!(tree.root().y, 2.75);
    /// ```
    pub fn compute_layout_from(&mut self, mode: PaintMode, height: f64) -> Result<(), TreeError> {
        let order = self.layout_order(mode)?;

        let mut slot = height;
        for id in order.iter() {
            let node = self.get(id)?;
            let mut x = match node.parent() {
                Some(parent) => self.get(&parent)?.x + node.distance,
                None => 0.0,
            };
            if mode == PaintMode::Collapsed
                && node.collapsed
                && self.n_descendants(id, mode)? > 1
            {
                x += self.max_distance_to_leaf(id)?.max(MIN_COLLAPSED_WIDTH);
            }
            let is_atom = mode.is_atom(node);

            let node = self.get_mut(id)?;
            node.x = x;
            if is_atom {
                node.y = slot;
                slot += 1.0;
            }
        }

        // Children are laid out before their parents in reverse preorder
        for id in order.iter().rev() {
            let node = self.get(id)?;
            if mode.is_atom(node) {
                continue;
            }
            let mut ys = Vec::with_capacity(node.children().len());
            for child in node.children() {
                ys.push(self.get(child)?.y);
            }
            if let Some((min, max)) = ys.into_iter().minmax().into_option() {
                self.get_mut(id)?.y = (min + max) / 2.0;
            }
        }

        Ok(())
    }

    /// Lays out the tree and paints it with `painter`.
    ///
    /// Once [`Painter::start`] has succeeded, [`Painter::end`] is called on every
    /// exit path, including failed drawing calls and panics.
    pub fn paint_tree<P: Painter>(
        &mut self,
        painter: &mut P,
        mode: PaintMode,
    ) -> Result<(), PaintError<P::Error>> {
        self.compute_layout(mode)?;

        let geometry = Geometry::new(&*painter);
        let order = self.layout_order(mode)?;

        let mut tree_width = 0;
        for id in order.iter().skip(1) {
            let node = self.get(id)?;
            tree_width = tree_width.max(geometry.x(node) + geometry.label_width(&node.name));
        }
        let height = geometry.font_height * (self.size(mode)? as i32 + 1);

        let mut width = tree_width;
        if mode == PaintMode::Demarcated {
            let mut max_label = 0;
            for id in self.collapsed()? {
                max_label = max_label.max(geometry.label_width(&self.get(&id)?.name));
            }
            width += DEMARCATION_PADDING + geometry.x_spacer + max_label;
        }

        debug!("Painting {mode:?} tree on a {width}x{height} canvas");
        let mut session = PaintSession::start(painter, width, height).map_err(PaintError::Painter)?;
        self.paint_nodes(
            &mut *session.painter,
            mode,
            &geometry,
            tree_width + DEMARCATION_OFFSET,
        )?;

        session.finish().map_err(PaintError::Painter)
    }

    fn paint_nodes<P: Painter>(
        &self,
        painter: &mut P,
        mode: PaintMode,
        geometry: &Geometry,
        bar_x: i32,
    ) -> Result<(), PaintError<P::Error>> {
        enum Step {
            Node(NodeId),
            Edge(NodeId, NodeId),
        }

        let mut stack = vec![Step::Node(self.get_root())];
        while let Some(step) = stack.pop() {
            match step {
                Step::Node(id) => {
                    let node = self.get(&id)?;
                    if mode.is_atom(node) {
                        trace!("Painting label of node {id}");
                        painter
                            .draw_string(
                                &node.name,
                                geometry.x(node) + geometry.x_spacer,
                                geometry.y(node) + geometry.y_spacer - 2,
                            )
                            .map_err(PaintError::Painter)?;
                    } else {
                        for child in node.children().iter().rev() {
                            stack.push(Step::Node(*child));
                            stack.push(Step::Edge(id, *child));
                        }
                    }
                }
                Step::Edge(parent, child) => {
                    trace!("Painting branch from node {parent} to node {child}");
                    self.paint_edge(painter, mode, geometry, bar_x, parent, child)?;
                }
            }
        }

        Ok(())
    }

    /// Paints the branch to `child` and the demarcation of `child` if any
    fn paint_edge<P: Painter>(
        &self,
        painter: &mut P,
        mode: PaintMode,
        geometry: &Geometry,
        bar_x: i32,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), PaintError<P::Error>> {
        let (node, child_node) = (self.get(&parent)?, self.get(&child)?);
        let (node_x, node_y) = (geometry.x(node), geometry.y(node));
        let (child_x, child_y) = (geometry.x(child_node), geometry.y(child_node));

        painter
            .draw_line(node_x, node_y, node_x, child_y, STROKE)
            .map_err(PaintError::Painter)?;

        if child_node.collapsed
            && mode == PaintMode::Collapsed
            && self.n_descendants(&child, mode)? > 1
        {
            let top = child_y - geometry.y_spacer + 1;
            let bottom = child_y + geometry.y_spacer - 1;
            for (x1, y1, x2, y2) in [
                (node_x, child_y, child_x, top),
                (node_x, child_y, child_x, bottom),
                (child_x, top, child_x, bottom),
            ] {
                painter
                    .draw_line(x1, y1, x2, y2, STROKE)
                    .map_err(PaintError::Painter)?;
            }
        } else {
            painter
                .draw_line(node_x, child_y, child_x, child_y, STROKE)
                .map_err(PaintError::Painter)?;
        }

        if child_node.collapsed && mode == PaintMode::Demarcated {
            let mut ys = vec![];
            for id in self.get_subtree(&child)? {
                ys.push(geometry.y(self.get(&id)?));
            }
            if let Some((min, max)) = ys.into_iter().minmax().into_option() {
                let label_y = (f64::from(min + max) / 2.0).round() as i32;
                painter
                    .draw_line(
                        bar_x,
                        min - geometry.y_spacer + 2,
                        bar_x,
                        max + geometry.y_spacer - 2,
                        DEMARCATION_STROKE,
                    )
                    .map_err(PaintError::Painter)?;
                painter
                    .draw_string(
                        &child_node.name,
                        bar_x + geometry.font_width,
                        label_y + geometry.y_spacer - 2,
                    )
                    .map_err(PaintError::Painter)?;
            }
        }

        Ok(())
    }
}
