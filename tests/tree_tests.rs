use std::convert::Infallible;

use ecotree::tree::{NewickParseError, PaintMode, Painter, Tree, TreeError};
use ecotree::{generate_caterpillar, generate_tree};

const NEWICK: &str = "((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);";

fn names(tree: &Tree, ids: &[usize]) -> Vec<String> {
    ids.iter()
        .map(|id| tree.get(id).unwrap().name.clone())
        .collect()
}

fn sorted_leaf_names(tree: &Tree) -> Vec<String> {
    let mut leaves = tree.get_leaf_names().unwrap();
    leaves.sort();
    leaves
}

fn leaf_distance(tree: &Tree, a: &str, b: &str) -> f64 {
    let a = tree.get_descendant(a).unwrap();
    let b = tree.get_descendant(b).unwrap();
    tree.get_distance(&a, &b).unwrap()
}

/// Counts drawing calls
#[derive(Default)]
struct CountingPainter {
    strings: Vec<String>,
    lines: usize,
    canvas: Option<(i32, i32)>,
    ended: bool,
}

impl Painter for CountingPainter {
    type Error = Infallible;

    fn font_width(&self) -> i32 {
        6
    }

    fn font_height(&self) -> i32 {
        10
    }

    fn start(&mut self, width: i32, height: i32) -> Result<(), Self::Error> {
        self.canvas = Some((width, height));
        Ok(())
    }

    fn draw_string(&mut self, text: &str, _x: i32, _y: i32) -> Result<(), Self::Error> {
        self.strings.push(text.to_string());
        Ok(())
    }

    fn draw_line(
        &mut self,
        _x1: i32,
        _y1: i32,
        _x2: i32,
        _y2: i32,
        _stroke: i32,
    ) -> Result<(), Self::Error> {
        self.lines += 1;
        Ok(())
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        self.ended = true;
        Ok(())
    }
}

// --- SCENARIOS ---
#[test]
fn parse_scenario() {
    let tree = Tree::from_newick(NEWICK).unwrap();

    assert_eq!(tree.root().children().len(), 2);
    assert_eq!(sorted_leaf_names(&tree), vec!["A", "B", "C", "D"]);

    let a = tree.get_descendant("A").unwrap();
    assert!((tree.distance_from_root(&a).unwrap() - 0.4).abs() < 1e-9);
}

#[test]
fn remove_scenario() {
    let mut tree = Tree::from_newick(NEWICK).unwrap();
    tree.remove_descendant_by_name("A").unwrap();

    assert_eq!(tree.to_newick().unwrap(), "(B:0.5,(C:0.4,D:0.5):0.6);");
}

#[test]
fn reroot_scenario() {
    let mut tree = Tree::from_newick(NEWICK).unwrap();
    let original = tree.clone();
    tree.reroot_by_name("C").unwrap();

    let root = tree.root();
    let c = tree.get_descendant("C").unwrap();
    assert_eq!(tree.get(&c).unwrap().parent(), Some(tree.get_root()));
    assert!((tree.get(&c).unwrap().distance - 0.2).abs() < 1e-9);

    let other = root.children().iter().find(|id| **id != c).unwrap();
    let mut other_leaves: Vec<_> = tree
        .get_descendants(other)
        .unwrap()
        .into_iter()
        .filter(|id| tree.get(id).unwrap().is_leaf())
        .collect();
    other_leaves.sort_by_key(|id| tree.get(id).unwrap().name.clone());
    assert_eq!(names(&tree, &other_leaves), vec!["A", "B", "D"]);

    for (a, b) in [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("A", "D")] {
        assert!((leaf_distance(&tree, a, b) - leaf_distance(&original, a, b)).abs() < 1e-9);
    }
}

#[test]
fn layout_scenario() {
    let mut tree = Tree::from_newick(NEWICK).unwrap();
    tree.compute_layout(PaintMode::Normal).unwrap();

    let ys: Vec<_> = tree
        .get_leaves()
        .unwrap()
        .iter()
        .map(|id| tree.get(id).unwrap().y)
        .collect();
    assert_eq!(ys, vec![0.0, 1.0, 2.0, 3.0]);

    let internal_ys: Vec<_> = tree
        .root()
        .children()
        .iter()
        .map(|id| tree.get(id).unwrap().y)
        .collect();
    assert_eq!(internal_ys, vec![0.5, 2.5]);
    assert_eq!(tree.root().y, 1.5);
}

#[test]
fn paint_collapsed_scenario() {
    let mut tree = Tree::from_newick("((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5):0.6);").unwrap();
    let ab = tree.get_descendant("AB").unwrap();
    tree.get_mut(&ab).unwrap().collapsed = true;

    let mut painter = CountingPainter::default();
    tree.paint_tree(&mut painter, PaintMode::Collapsed).unwrap();

    assert_eq!(painter.strings, vec!["AB", "C", "D"]);
    // 3 branches with 2 segments and a triangle with 4
    assert_eq!(painter.lines, 10);
    assert_eq!(painter.canvas, Some((1118, 40)));
    assert!(painter.ended);
}

#[test]
fn quoted_label_scenario() {
    let mut tree = Tree::new();
    let root = tree.get_root();
    tree.add_child(ecotree::tree::Node::new_named("x,y"), root, 1.0)
        .unwrap();
    tree.add_child(ecotree::tree::Node::new_named("z"), root, 2.0)
        .unwrap();

    let newick = tree.to_newick().unwrap();
    assert_eq!(newick, "('x,y':1,z:2);");

    let parsed = Tree::from_newick(&newick).unwrap();
    assert_eq!(parsed.get_leaf_names().unwrap(), vec!["x,y", "z"]);
}

// --- BOUNDARIES ---
#[test]
fn reject_degenerate_trees() {
    for newick in ["();", "a;", "", "(a);"] {
        assert!(
            Tree::from_newick(newick).is_err(),
            "{newick:?} should not be parsed"
        );
    }
}

#[test]
fn remove_down_to_a_single_leaf() {
    let mut tree = Tree::from_newick("(A:1,(B:2,C:3):4);").unwrap();

    tree.remove_descendant_by_name("A").unwrap();
    assert_eq!(tree.to_newick().unwrap(), "(B:2,C:3);");
    assert_eq!(tree.root().distance, 4.0);

    tree.remove_descendant_by_name("B").unwrap();
    assert_eq!(tree.root().name, "C");
    assert_eq!(tree.root().distance, 7.0);
    assert!(!tree.is_valid());
}

#[test]
fn missing_names() {
    let mut tree = Tree::from_newick(NEWICK).unwrap();
    assert_eq!(tree.get_descendant("E"), None);
    assert!(matches!(
        tree.reroot_by_name("E"),
        Err(TreeError::NameNotFound(_))
    ));
    assert!(matches!(
        tree.remove_descendant_by_name("E"),
        Err(TreeError::NameNotFound(_))
    ));
}

// --- PROPERTIES ---
#[test]
fn round_trip_random_trees() {
    for _ in 0..20 {
        let tree = generate_tree(30).unwrap();
        let parsed = Tree::from_newick(&tree.to_newick().unwrap()).unwrap();

        assert_eq!(tree, parsed);
        assert_eq!(tree.to_newick().unwrap(), parsed.to_newick().unwrap());
    }
}

#[test]
fn size_is_leaf_count() {
    for n_leaves in [2, 7, 64] {
        let tree = generate_tree(n_leaves).unwrap();
        assert_eq!(tree.size(PaintMode::Normal).unwrap(), n_leaves);
        assert_eq!(tree.maximum_y(PaintMode::Normal).unwrap(), n_leaves as f64);
    }
}

#[test]
fn remove_random_leaves() {
    for _ in 0..10 {
        let mut tree = generate_tree(20).unwrap();

        for removed in ["Tip_3", "Tip_11", "Tip_0", "Tip_19"] {
            let kept: Vec<_> = tree
                .get_leaves()
                .unwrap()
                .into_iter()
                .filter(|id| tree.get(id).unwrap().name != removed)
                .map(|id| {
                    (
                        tree.get(&id).unwrap().name.clone(),
                        tree.distance_from_root(&id).unwrap(),
                    )
                })
                .collect();

            tree.remove_descendant_by_name(removed).unwrap();

            assert_eq!(tree.n_leaves().unwrap(), kept.len());
            for (name, distance) in kept {
                let id = tree.get_descendant(&name).unwrap();
                assert!((tree.distance_from_root(&id).unwrap() - distance).abs() < 1e-9);
            }
        }

        for id in tree.preorder(&tree.get_root()).unwrap() {
            let node = tree.get(&id).unwrap();
            assert!(node.is_leaf() || node.children().len() >= 2);
        }
    }
}

#[test]
fn double_reroot_keeps_distances() {
    for _ in 0..10 {
        let original = generate_tree(12).unwrap();
        let mut tree = original.clone();
        tree.reroot_by_name("Tip_4").unwrap();
        tree.reroot_by_name("Tip_9").unwrap();

        assert_eq!(sorted_leaf_names(&tree), sorted_leaf_names(&original));
        for i in 0..12 {
            for j in (i + 1)..12 {
                let (a, b) = (format!("Tip_{i}"), format!("Tip_{j}"));
                let before = leaf_distance(&original, &a, &b);
                let after = leaf_distance(&tree, &a, &b);
                assert!((before - after).abs() < 1e-9, "{a} {b}: {before} != {after}");
            }
        }
    }
}

// --- FILES ---
#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.nwk");

    let tree = Tree::from_newick("(('leaf one':0.5,B:1e-4)AB:2,C:3)root;").unwrap();
    tree.to_file(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "(('leaf one':0.5,B:0.0001)AB:2,C:3)root;\n");

    let read = Tree::from_file(&path).unwrap();
    assert_eq!(tree, read);
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Tree::from_file(&dir.path().join("missing.nwk")),
        Err(NewickParseError::IoError(_))
    ));
}

#[test]
fn read_from_reader() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "(A:1,B:2);\n(C:1,D:2);\n").unwrap();

    // Only the first tree is read
    let tree = Tree::from_reader(std::fs::File::open(file.path()).unwrap()).unwrap();
    assert_eq!(tree.get_leaf_names().unwrap(), vec!["A", "B"]);
}

// --- DEEP TREES ---
#[test]
fn deep_caterpillar() {
    let n_leaves = 100_000;
    let mut tree = generate_caterpillar(n_leaves).unwrap();

    assert_eq!(tree.preorder(&tree.get_root()).unwrap().len(), 2 * n_leaves - 1);
    assert_eq!(tree.postorder(&tree.get_root()).unwrap().len(), 2 * n_leaves - 1);
    assert_eq!(tree.n_leaves().unwrap(), n_leaves);
    assert!(tree.maximum_width().unwrap() > 0.0);

    let newick = tree.to_newick().unwrap();
    assert!(newick.ends_with(';'));
    assert_eq!(newick.matches('(').count(), n_leaves - 1);

    let mut painter = CountingPainter::default();
    tree.paint_tree(&mut painter, PaintMode::Normal).unwrap();
    assert_eq!(painter.strings.len(), n_leaves);
    assert_eq!(painter.lines, 2 * (2 * n_leaves - 2));

    assert_eq!(tree.compare(&tree.clone()).unwrap(), std::cmp::Ordering::Equal);

    let deepest = format!("Tip_{n_leaves}");
    tree.reroot_by_name(&deepest).unwrap();
    assert_eq!(tree.n_leaves().unwrap(), n_leaves);
    tree.remove_descendant_by_name(&deepest).unwrap();
    assert_eq!(tree.n_leaves().unwrap(), n_leaves - 1);
}

#[test]
fn deep_caterpillar_round_trip() {
    let n_leaves = 100_000;
    let tree = generate_caterpillar(n_leaves).unwrap();

    let parsed = Tree::from_newick(&tree.to_newick().unwrap()).unwrap();
    assert_eq!(parsed.n_leaves().unwrap(), n_leaves);
    assert_eq!(tree, parsed);
}

#[test]
fn parse_nested_tree() {
    let tree = generate_caterpillar(1000).unwrap();
    let parsed = Tree::from_newick(&tree.to_newick().unwrap()).unwrap();
    assert_eq!(tree, parsed);
}
