//! Reading and writing trees in the
//! [Newick format](https://en.wikipedia.org/wiki/Newick_format).
//!
//! The reader accepts quoted labels (`'a label'`, with `''` standing for a literal quote),
//! branch lengths in any notation understood by [`f64::from_str`](std::str::FromStr),
//! `[comments]` that are discarded, and arbitrary whitespace between tokens.
//!
//! ```
//! use ecotree::tree::{NewickReader, NewickWriter};
//!
//! let tree = NewickReader::new("('my leaf':1, B:2) root;".as_bytes()).read_tree().unwrap();
//!
//! let mut output = Vec::new();
//! NewickWriter::new(&mut output).write_tree(&tree).unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap(), "('my leaf':1,B:2)root;\n");
//! ```

use std::io::{Read, Write};

use log::debug;
use thiserror::Error;

use super::node::Node;
use super::tree_impl::{Tree, TreeError};
use super::NodeId;

/// Characters that end an unquoted label
const DELIMITERS: [char; 7] = ['(', ')', '[', ']', ',', ':', ';'];

/// Errors that can occur when parsing newick data.
#[derive(Error, Debug)]
pub enum NewickParseError {
    /// The input ended before the tree was complete
    #[error("The newick string ended before the closing semicolon.")]
    Truncated,
    /// A character that is not allowed at this position
    #[error("Unexpected character {found:?} at offset {offset}.")]
    UnexpectedCharacter {
        /// The offending character
        found: char,
        /// Position of the character in the input
        offset: usize,
    },
    /// A quoted label is never closed
    #[error("The quoted label starting at offset {0} is never closed.")]
    UnterminatedQuotedLabel(usize),
    /// The root or an internal node has less than 2 children
    #[error("The node at offset {0} has less than 2 children.")]
    NotEnoughLeaves(usize),
    /// A branch length could not be read as a finite number
    #[error("Could not parse branch length {value:?} at offset {offset}.")]
    NonNumericLength {
        /// The unparsed branch length
        value: String,
        /// Position of the branch length in the input
        offset: usize,
    },
    /// Branch lengths must be positive or zero
    #[error("Negative branch length {value} at offset {offset}.")]
    NegativeLength {
        /// The branch length
        value: f64,
        /// Position of the branch length in the input
        offset: usize,
    },
    /// There was a [`TreeError`] when building a tree from the newick string
    #[error("Problem with building the tree.")]
    TreeError(#[from] TreeError),
    /// There was a [`std::io::Error`] when reading newick data
    #[error("Problem reading newick data")]
    IoError(#[from] std::io::Error),
}

/// Reads a single newick tree from a reader.
///
/// The reader is consumed by [`NewickReader::read_tree`] and dropped on every
/// exit path.
pub struct NewickReader<R: Read> {
    reader: R,
}

impl<R: Read> NewickReader<R> {
    /// Wraps a reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the whole input and parses the tree it contains.
    /// Anything after the closing semicolon is ignored.
    pub fn read_tree(mut self) -> Result<Tree, NewickParseError> {
        let mut newick = String::new();
        self.reader.read_to_string(&mut newick)?;

        let tree = Parser::new(&newick).parse()?;
        debug!(
            "Parsed newick tree with {} descendants",
            tree.descendants()?.len()
        );

        Ok(tree)
    }
}

/// Parser over the characters of a newick string, open clades are kept on an explicit stack
struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(newick: &str) -> Self {
        Self {
            chars: newick.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self) -> NewickParseError {
        match self.peek() {
            Some(found) => NewickParseError::UnexpectedCharacter {
                found,
                offset: self.pos,
            },
            None => NewickParseError::Truncated,
        }
    }

    /// Skips whitespace and comments
    fn skip_ignored(&mut self) -> Result<(), NewickParseError> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '[' {
                let end = self.chars[self.pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .ok_or(NewickParseError::Truncated)?;
                self.pos += end + 1;
            } else {
                break;
            }
        }

        Ok(())
    }

    fn parse(mut self) -> Result<Tree, NewickParseError> {
        let mut tree = Tree::new();
        // Clades whose closing parenthesis has not been read yet, with their offset
        let mut open: Vec<(NodeId, usize)> = vec![];

        'subtree: loop {
            self.skip_ignored()?;
            let id = match open.last() {
                Some((parent, _)) => tree.add_child(Node::new(), *parent, 0.0)?,
                None => tree.get_root(),
            };

            match self.peek() {
                None => return Err(NewickParseError::Truncated),
                Some('(') => {
                    open.push((id, self.pos));
                    self.pos += 1;
                    continue 'subtree;
                }
                Some(_) => self.parse_node(&mut tree, id)?,
            }

            loop {
                self.skip_ignored()?;
                let (id, start) = match open.last() {
                    Some(clade) => *clade,
                    None => break 'subtree,
                };
                match self.peek() {
                    Some(',') => {
                        self.pos += 1;
                        continue 'subtree;
                    }
                    Some(')') => {
                        self.pos += 1;
                        open.pop();
                        if tree.get(&id)?.children().len() < 2 {
                            return Err(NewickParseError::NotEnoughLeaves(start));
                        }
                        self.skip_ignored()?;
                        self.parse_node(&mut tree, id)?;
                    }
                    _ => return Err(self.unexpected()),
                }
            }
        }

        if tree.root().is_leaf() {
            return Err(NewickParseError::NotEnoughLeaves(0));
        }

        match self.peek() {
            Some(';') => Ok(tree),
            _ => Err(self.unexpected()),
        }
    }

    /// Reads the label and branch length of the node `id`
    fn parse_node(&mut self, tree: &mut Tree, id: NodeId) -> Result<(), NewickParseError> {
        let name = self.parse_label()?;
        self.skip_ignored()?;
        let distance = self.parse_length()?;

        let node = tree.get_mut(&id)?;
        node.set_name(name);
        node.distance = distance;

        Ok(())
    }

    fn parse_label(&mut self) -> Result<String, NewickParseError> {
        let mut label = String::new();

        if self.peek() == Some('\'') {
            let start = self.pos;
            self.pos += 1;
            loop {
                match self.peek() {
                    None => return Err(NewickParseError::UnterminatedQuotedLabel(start)),
                    Some('\'') => {
                        self.pos += 1;
                        if self.peek() == Some('\'') {
                            label.push('\'');
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                    Some(c) => {
                        label.push(c);
                        self.pos += 1;
                    }
                }
            }
        } else {
            while let Some(c) = self.peek() {
                if c.is_whitespace() || DELIMITERS.contains(&c) {
                    break;
                }
                label.push(c);
                self.pos += 1;
            }
        }

        Ok(label)
    }

    /// Parses an optional `:length`, absent lengths are 0
    fn parse_length(&mut self) -> Result<f64, NewickParseError> {
        if self.peek() != Some(':') {
            return Ok(0.0);
        }
        self.pos += 1;
        self.skip_ignored()?;

        let offset = self.pos;
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || DELIMITERS.contains(&c) {
                break;
            }
            value.push(c);
            self.pos += 1;
        }

        match value.parse::<f64>() {
            Ok(length) if length.is_finite() && length >= 0.0 => Ok(length),
            Ok(length) if length.is_finite() => Err(NewickParseError::NegativeLength {
                value: length,
                offset,
            }),
            _ => Err(NewickParseError::NonNumericLength { value, offset }),
        }
    }
}

/// Writes trees in the newick format, one tree per line
pub struct NewickWriter<W: Write> {
    writer: W,
}

impl<W: Write> NewickWriter<W> {
    /// Wraps a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the tree followed by a newline and flushes the writer
    pub fn write_tree(&mut self, tree: &Tree) -> Result<(), TreeError> {
        writeln!(self.writer, "{}", tree.to_newick()?)?;
        self.writer.flush()?;

        Ok(())
    }
}

/// Formats the subtree rooted at `id`, without the closing semicolon
pub(crate) fn format_subtree(tree: &Tree, id: &NodeId) -> Result<String, TreeError> {
    enum Step {
        Enter(NodeId),
        Separator,
        Leave(NodeId),
    }

    let mut newick = String::new();
    let mut stack = vec![Step::Enter(*id)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                let node = tree.get(&id)?;
                if node.is_leaf() {
                    push_node(&mut newick, node);
                    continue;
                }
                newick.push('(');
                stack.push(Step::Leave(id));
                for (i, child) in node.children().iter().enumerate().rev() {
                    stack.push(Step::Enter(*child));
                    if i > 0 {
                        stack.push(Step::Separator);
                    }
                }
            }
            Step::Separator => newick.push(','),
            Step::Leave(id) => {
                newick.push(')');
                push_node(&mut newick, tree.get(&id)?);
            }
        }
    }

    Ok(newick)
}

/// Appends the label and branch length of a node
fn push_node(newick: &mut String, node: &Node) {
    newick.push_str(&escape_label(&node.name));
    if node.parent().is_some() {
        newick.push(':');
        newick.push_str(&node.distance.to_string());
    }
}

/// Quotes labels that could not be read back as a single unquoted label
fn escape_label(label: &str) -> String {
    if label
        .chars()
        .any(|c| c.is_whitespace() || c == '\'' || DELIMITERS.contains(&c))
    {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(newick: &str) -> Result<Tree, NewickParseError> {
        NewickReader::new(newick.as_bytes()).read_tree()
    }

    fn leaf_names(tree: &Tree) -> Vec<String> {
        tree.get_leaf_names().unwrap()
    }

    #[test]
    fn read_newick() {
        let newick_strings = vec![
            "((D:0.723274,F:0.567784)E:0.067192,(B:0.279326,H:0.756049)G:0.807788);",
            "((D:0.723274,F:0.567784)E:0.067192,(B:0.279326,H:0.756049)G:0.807788)A;",
            "((A:0.11,B:0.22)C:0.33,(D:0.44,E:0.55)F:0.66)G;",
            "((A:1e-3,B:2)C:0.5,D:1)E;",
            "((A:1,B:1,C:1)X:1,(D:2,E:2)Y:3,F:0)Z;",
        ];
        for newick in newick_strings {
            let tree = parse(newick).unwrap();
            assert_eq!(tree.to_newick().unwrap().replace(":0.001", ":1e-3"), newick);
        }
    }

    #[test]
    fn missing_lengths_are_zero() {
        let tree = parse("((A,B)C,(D,E)F)G;").unwrap();
        assert_eq!(
            tree.to_newick().unwrap(),
            "((A:0,B:0)C:0,(D:0,E:0)F:0)G;"
        );
    }

    #[test]
    fn read_lengths() {
        let tree = parse("((A:0.1,B:+2)C:1E1,D)R;").unwrap();
        let lengths: Vec<_> = tree
            .descendants()
            .unwrap()
            .iter()
            .map(|id| tree.get(id).unwrap().distance)
            .collect();
        assert_eq!(lengths, vec![10.0, 0.1, 2.0, 0.0]);
        assert_eq!(tree.root().distance, 0.0);
    }

    #[test]
    fn read_root_length() {
        let tree = parse("(A:1,B:2)R:4;").unwrap();
        assert_eq!(tree.root().name, "R");
        assert_eq!(tree.root().distance, 4.0);
        // The root branch length is not written back
        assert_eq!(tree.to_newick().unwrap(), "(A:1,B:2)R;");
    }

    #[test]
    fn skip_whitespace_and_comments() {
        let tree = parse(
            " ( ( A [first leaf] : 0.1 ,\n\tB:0.2 ) [&&NHX:S=x] AB : 0.3 , [ ] C : 1 ) ; trailing text",
        )
        .unwrap();
        assert_eq!(tree.to_newick().unwrap(), "((A:0.1,B:0.2)AB:0.3,C:1);");
    }

    #[test]
    fn read_quoted_labels() {
        let tree = parse("('A leaf':1,'it''s':2,'(x:y)');").unwrap();
        assert_eq!(leaf_names(&tree), vec!["A leaf", "it's", "(x:y)"]);
        assert_eq!(
            tree.to_newick().unwrap(),
            "('A leaf':1,'it''s':2,'(x:y)');"
        );
    }

    #[test]
    fn quoted_label_round_trip() {
        let tree = parse("('x,y':1,z:2);").unwrap();
        assert_eq!(leaf_names(&tree), vec!["x,y", "z"]);

        let reparsed = parse(&tree.to_newick().unwrap()).unwrap();
        assert_eq!(leaf_names(&reparsed), vec!["x,y", "z"]);
        assert_eq!(tree, reparsed);
    }

    #[test]
    fn read_unquoted_apostrophe() {
        let tree = parse("(O'Neil:1,B:2);").unwrap();
        assert_eq!(leaf_names(&tree), vec!["O'Neil", "B"]);
        assert_eq!(tree.to_newick().unwrap(), "('O''Neil':1,B:2);");
        assert_eq!(parse(&tree.to_newick().unwrap()).unwrap(), tree);
    }

    #[test]
    fn read_deep_nesting() {
        let depth = 100_000;
        let mut newick = "(".repeat(depth);
        newick.push_str("A:1,B:1)");
        newick.push_str(&",C:1)".repeat(depth - 1));
        newick.push(';');

        let tree = parse(&newick).unwrap();
        assert_eq!(tree.n_leaves().unwrap(), depth + 1);
        let a = tree.get_descendant("A").unwrap();
        assert_eq!(tree.get_path_from_root(&a).unwrap().len(), depth + 1);
    }

    #[test]
    fn escape_labels() {
        assert_eq!(escape_label("plain_label.1"), "plain_label.1");
        assert_eq!(escape_label("two words"), "'two words'");
        assert_eq!(escape_label("a;b"), "'a;b'");
        assert_eq!(escape_label("O'Neil"), "'O''Neil'");
        assert_eq!(escape_label(""), "");
    }

    #[test]
    fn reject_invalid_trees() {
        assert!(matches!(parse(""), Err(NewickParseError::Truncated)));
        assert!(matches!(parse(" [empty] \n"), Err(NewickParseError::Truncated)));
        assert!(matches!(parse("();"), Err(NewickParseError::NotEnoughLeaves(0))));
        assert!(matches!(parse("a;"), Err(NewickParseError::NotEnoughLeaves(0))));
        assert!(matches!(parse("(a);"), Err(NewickParseError::NotEnoughLeaves(0))));
        assert!(matches!(
            parse("((a),b);"),
            Err(NewickParseError::NotEnoughLeaves(1))
        ));
    }

    #[test]
    fn reject_truncated() {
        for newick in ["(a,b)", "(a,b", "(a,", "((a,b),", "(a:1,b:2)[unclosed", "  \n"] {
            let result = parse(newick);
            assert!(
                matches!(result, Err(NewickParseError::Truncated)),
                "{newick}: {result:?}"
            );
        }
    }

    #[test]
    fn reject_unexpected_characters() {
        assert!(matches!(
            parse("(a,b)c d;"),
            Err(NewickParseError::UnexpectedCharacter { found: 'd', offset: 7 })
        ));
        assert!(matches!(
            parse("(a(b,c));"),
            Err(NewickParseError::UnexpectedCharacter { found: '(', offset: 2 })
        ));
        assert!(matches!(
            parse("(a,b]);"),
            Err(NewickParseError::UnexpectedCharacter { found: ']', .. })
        ));
    }

    #[test]
    fn reject_unterminated_quote() {
        assert!(matches!(
            parse("(a,'b c);"),
            Err(NewickParseError::UnterminatedQuotedLabel(3))
        ));
    }

    #[test]
    fn reject_bad_lengths() {
        match parse("(a:1,b:x2);") {
            Err(NewickParseError::NonNumericLength { value, offset }) => {
                assert_eq!(value, "x2");
                assert_eq!(offset, 7);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(matches!(
            parse("(a:,b);"),
            Err(NewickParseError::NonNumericLength { .. })
        ));
        assert!(matches!(
            parse("(a:inf,b);"),
            Err(NewickParseError::NonNumericLength { .. })
        ));
        assert!(matches!(
            parse("(a:1,b:-0.5);"),
            Err(NewickParseError::NegativeLength { value, .. }) if value == -0.5
        ));
    }

    #[test]
    fn write_tree_to_writer() {
        let tree = parse("((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);").unwrap();
        let mut output = Vec::new();
        NewickWriter::new(&mut output).write_tree(&tree).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "((A:0.1,B:0.2):0.3,(C:0.4,D:0.5):0.6);\n"
        );
    }

    #[test]
    fn format_subtrees() {
        let tree = parse("((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5):0.6)R;").unwrap();
        let a = tree.get_descendant("A").unwrap();
        assert_eq!(format_subtree(&tree, &a).unwrap(), "A:0.1");
        assert_eq!(format_subtree(&tree, &tree.get_root()).unwrap(), "((A:0.1,B:0.2)AB:0.3,(C:0.4,D:0.5):0.6)R");
    }
}
