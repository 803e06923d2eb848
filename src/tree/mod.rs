//! Build, manipulate and draw phylogenetic trees.
//!
//! This module defines the two essential structs to represent phylogenetic trees:
//!  - The [`Node`] struct that represents a node of a phylogenetic tree.
//!  - The [`Tree`] struct that holds a collection of [`Node`] objects.
//!
//! Trees are read from and written to Newick with the [`newick`] module,
//! and laid out and painted as cladograms with the [`draw`] module.
//!

/// A module to lay out and paint phylogenetic trees
pub mod draw;
/// A module to read and write Newick formatted trees
pub mod newick;
mod node;
mod tree_impl;

pub use self::draw::{PaintError, PaintMode, Painter};
pub use self::newick::{NewickParseError, NewickReader, NewickWriter};
pub use self::node::{Node, NodeError};
pub use self::tree_impl::{Tree, TreeError};

/// A type that represents Identifiers of [`Node`] objects
/// within phylogenetic [`Tree`] object.
pub type NodeId = usize;

/// A type that represents branch lengths between [`Node`] objects
/// within phylogenetic [`Tree`] object.
pub type EdgeLength = f64;
