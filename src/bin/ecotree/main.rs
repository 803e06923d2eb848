#![warn(missing_docs)]
//! The `ecotree` binary is a command line tool, using the `[ecotree]` crate.
//! It is made to inspect, reroot, prune and draw phylogenetic trees directly in the terminal.

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use color_eyre::eyre::{eyre, Result};
use ecotree::tree::{NewickWriter, Tree};
use log::{debug, info, warn};
use std::{
    fs::File,
    io,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// contains the struct representing the command line arguments
/// parsed by [`clap`] and used to execute this binary
pub mod cli;
/// SVG implementation of the [`ecotree::tree::Painter`] trait
mod svg;

fn print_stats_header(name: bool) {
    if name {
        println!("filename\tleaves\tdescendants\twidth\tvalid")
    } else {
        println!("leaves\tdescendants\twidth\tvalid")
    }
}

fn print_stats(path: &Path, name: bool) -> Result<()> {
    let tree = Tree::from_file(path)?;

    let name = if name {
        format!("{:?}\t", path)
    } else {
        "".into()
    };

    println!("{name}{}", stats_row(&tree)?);

    Ok(())
}

/// Tab separated leaves, descendants, width and validity of a tree
fn stats_row(tree: &Tree) -> Result<String> {
    Ok(format!(
        "{}\t{}\t{}\t{}",
        tree.n_leaves()?,
        tree.descendants()?.len(),
        tree.maximum_width()?,
        tree.is_valid(),
    ))
}

fn output_writer(output: Option<PathBuf>) -> Result<BufWriter<Box<dyn Write>>> {
    Ok(BufWriter::new(match output {
        Some(path) => Box::new(File::create(&path)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    }))
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // initialize color_eyre crate for colorized errors
    color_eyre::install()?;

    // RUST_LOG takes precedence over the verbosity flag
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.verbosity.to_string()),
    )
    .init();

    match args.command {
        cli::Commands::Stats { trees } => {
            let print_name = trees.len() > 1;
            print_stats_header(print_name);
            for tree in trees {
                print_stats(&tree, print_name)?
            }
        }
        cli::Commands::Show { tree } => {
            let tree = Tree::from_file(&tree)?;
            tree.print()?;
        }
        cli::Commands::Reroot {
            tree,
            outgroup,
            output,
        } => {
            let mut tree = Tree::from_file(&tree)?;
            tree.reroot_by_name(&outgroup)?;
            info!("Rerooted tree on {outgroup:?}");

            NewickWriter::new(output_writer(output)?).write_tree(&tree)?;
        }
        cli::Commands::Remove { tree, tips, output } => {
            let mut tree = Tree::from_file(&tree)?;
            for tip_name in tips.iter() {
                let id = tree
                    .get_descendant(tip_name)
                    .ok_or_else(|| eyre!("There is no node named {tip_name:?}"))?;
                if !tree.get(&id)?.is_leaf() {
                    warn!("{tip_name:?} is not a leaf, it will not be removed");
                    continue;
                }
                tree.remove_descendant(&id)?;
                debug!("Removed {tip_name:?}");
            }

            NewickWriter::new(output_writer(output)?).write_tree(&tree)?;
        }
        cli::Commands::Draw {
            tree,
            mode,
            collapse,
            font_width,
            font_height,
            output,
        } => {
            let mut tree = Tree::from_file(&tree)?;
            for name in collapse.iter() {
                let id = tree
                    .get_descendant(name)
                    .ok_or_else(|| eyre!("There is no node named {name:?}"))?;
                tree.get_mut(&id)?.collapsed = true;
            }

            let mut painter = svg::SvgPainter::new(output_writer(output)?, font_width, font_height);
            tree.paint_tree(&mut painter, mode)?;
            info!("Painted {} descendants", tree.size(mode)?);
        }
        cli::Commands::Completion { shell } => {
            let mut cmd = cli::Args::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
