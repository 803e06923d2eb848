use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use ecotree::tree::PaintMode;

/// A command line tool to inspect, reroot, prune and draw phylogenetic trees
#[derive(Parser, Debug)]
pub struct Args {
    #[command(subcommand)]
    /// The command to execute
    pub command: Commands,

    /// Set the output verbosity level, `RUST_LOG` takes precedence
    #[arg(short, long, value_enum, global = true, default_value_t = Verbosity::default())]
    pub verbosity: Verbosity,
}

/// The output verbosity level
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Verbosity {
    /// Only errors
    Error,
    /// Errors and warnings
    Warn,
    /// General progress
    #[default]
    Info,
    /// Library internals
    Debug,
    /// Every painted node
    Trace,
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // Lowercase to be usable as a log filter
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}

/// The available commands in the `ecotree` tool
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get statistics about trees
    ///
    /// This will print, for each tree:
    ///  - the number of leaves
    ///  - the number of descendants of the root
    ///  - the maximum distance from the root to a leaf
    ///  - whether the tree is valid
    #[clap(verbatim_doc_comment)]
    Stats {
        /// Input newick files
        trees: Vec<PathBuf>,
    },
    /// Print the tree in the terminal
    Show {
        /// The phylogenetic tree
        tree: PathBuf,
    },
    /// Reroot the tree on an outgroup
    Reroot {
        /// The phylogenetic tree
        tree: PathBuf,
        /// Name of the outgroup node
        outgroup: String,
        /// File to save the tree to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove leaves from the tree
    Remove {
        /// The phylogenetic tree
        tree: PathBuf,
        /// Names of leaves to remove
        tips: Vec<String>,
        /// File to save the tree to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Draw the tree as an SVG cladogram
    Draw {
        /// The phylogenetic tree
        tree: PathBuf,
        /// How collapsed clades are drawn
        #[arg(value_enum, short, long, default_value_t = PaintMode::Normal)]
        mode: PaintMode,
        /// Names of the clades to collapse, can be repeated
        #[arg(short, long)]
        collapse: Vec<String>,
        /// Width of a character, in pixels
        #[arg(long, default_value_t = 7)]
        font_width: i32,
        /// Height of a character, in pixels
        #[arg(long, default_value_t = 12)]
        font_height: i32,
        /// SVG file to save the drawing to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completion {
        /// The shell to generate the completion script for
        shell: Shell,
    },
}
