//! Phylogenetic trees for ecotype simulations: read and write Newick trees,
//! reroot them, prune leaves and paint them as cladograms.
//!
//! ```
//! use ecotree::tree::{PaintMode, Tree};
//!
//! let mut tree = Tree::from_newick("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);").unwrap();
//! tree.reroot_by_name("C").unwrap();
//! tree.remove_descendant_by_name("A").unwrap();
//!
//! assert_eq!(tree.size(PaintMode::Normal).unwrap(), 3);
//! ```
use std::collections::VecDeque;

use rand::prelude::*;

use tree::{Node, Tree, TreeError};

pub mod tree;

/// Genereates a random binary tree of a given size. Branch lengths are uniformly distributed
/// over $[0.002, 1.0)$ and leaves are named `Tip_0`, `Tip_1`, ...
pub fn generate_tree(n_leaves: usize) -> Result<Tree, TreeError> {
    if n_leaves < 2 {
        return Err(TreeError::NotEnoughLeaves(n_leaves));
    }

    let mut tree = Tree::new();
    let mut rng = thread_rng();

    let mut next_deq = VecDeque::new();
    next_deq.push_back(tree.get_root());

    for _ in 0..(n_leaves - 1) {
        let parent_id = if rng.gen_bool(0.5) {
            next_deq.pop_front()
        } else {
            next_deq.pop_back()
        }
        .ok_or(TreeError::NotEnoughLeaves(n_leaves))?;
        let l1 = rng.gen_range(0.002..1.0);
        let l2 = rng.gen_range(0.002..1.0);
        next_deq.push_back(tree.add_child(Node::new(), parent_id, l1)?);
        next_deq.push_back(tree.add_child(Node::new(), parent_id, l2)?);
    }

    for (i, id) in next_deq.iter().enumerate() {
        tree.get_mut(id)?.set_name(format!("Tip_{i}"));
    }

    Ok(tree)
}

/// Generates a caterpillar tree by adding children to the last node added to the tree
/// until we reach the desired number of leaves. Branch lengths are uniformly distributed
/// over $[0, 1)$ and leaves are named `Tip_1`, ..., `Tip_n`
pub fn generate_caterpillar(n_leaves: usize) -> Result<Tree, TreeError> {
    if n_leaves < 2 {
        return Err(TreeError::NotEnoughLeaves(n_leaves));
    }

    let mut tree = Tree::new();
    let mut rng = thread_rng();

    let mut parent = tree.get_root();
    for i in 1..n_leaves {
        let parent_bkp = parent;
        let l1: f64 = rng.gen();
        let l2: f64 = rng.gen();
        if i == n_leaves - 1 {
            // Adding tip
            tree.add_child(Node::new_named(&format!("Tip_{i}")), parent, l1)?;
            tree.add_child(Node::new_named(&format!("Tip_{}", i + 1)), parent, l2)?;
        } else {
            // Adding parent node
            parent = tree.add_child(Node::new(), parent, l1)?;
            tree.add_child(Node::new_named(&format!("Tip_{i}")), parent_bkp, l2)?;
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::PaintMode;

    #[test]
    fn generated_trees_are_binary() {
        for n_leaves in [2, 3, 10, 100] {
            let tree = generate_tree(n_leaves).unwrap();
            assert_eq!(tree.n_leaves().unwrap(), n_leaves);
            assert_eq!(tree.size(PaintMode::Normal).unwrap(), n_leaves);
            for id in tree.preorder(&tree.get_root()).unwrap() {
                let node = tree.get(&id).unwrap();
                assert!(node.is_leaf() || node.children().len() == 2);
                if !node.is_root() {
                    assert!((0.002..1.0).contains(&node.distance));
                }
            }
        }
    }

    #[test]
    fn generated_caterpillar() {
        let tree = generate_caterpillar(5).unwrap();
        assert_eq!(
            tree.get_leaf_names().unwrap(),
            vec!["Tip_4", "Tip_5", "Tip_3", "Tip_2", "Tip_1"]
        );
        let deepest = tree.get_descendant("Tip_5").unwrap();
        assert_eq!(tree.get_path_from_root(&deepest).unwrap().len(), 5);
    }

    #[test]
    fn generators_need_two_leaves() {
        assert!(matches!(generate_tree(1), Err(TreeError::NotEnoughLeaves(1))));
        assert!(matches!(
            generate_caterpillar(0),
            Err(TreeError::NotEnoughLeaves(0))
        ));
    }
}
