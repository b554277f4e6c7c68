//! Command-line driver for `knowtree_core`.
//!
//! # Responsibility
//! - Run import, layout and search over JSON files for local checks.
//! - Print results as pretty JSON on stdout; errors go to stderr.

use clap::{Args, Parser, Subcommand};
use knowtree_core::{
    build_forest, core_version, default_log_level, flatten, header_columns, init_logging,
    layout_forest, reconcile_with_report, rows_from_json, CoreConfig, FieldMap, Node,
    SearchIndex,
};
use log::info;
use serde_json::json;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "knowtree", version, about = "Knowledge-tree import, layout and search")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// TOML file with `[layout]` / `[search]` tuning.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct a tree from a JSON array of row objects.
    Import {
        #[arg(long)]
        rows: PathBuf,
        /// JSON object `{title, type?, parent?, content?, tags?, link?}`.
        #[arg(long)]
        mapping: PathBuf,
        #[arg(long, default_value = "Imported")]
        root_title: String,
        /// Emit the tree as a flat node array linked by `parentId`.
        ///
        /// Nested JSON is capped by serde_json's recursion limit (about 60
        /// tree levels when read back); the flat form has no depth limit.
        #[arg(long)]
        flat: bool,
    },
    /// Lay out a tree (JSON node, array of roots, or flat node array) radially.
    Layout {
        #[arg(long)]
        tree: PathBuf,
    },
    /// Fuzzy-search a tree.
    Search {
        #[arg(long)]
        tree: PathBuf,
        #[arg(long)]
        query: String,
    },
    /// Print the core version.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.common.log_dir {
        let level = cli
            .common
            .log_level
            .as_deref()
            .unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = match &cli.common.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };

    let output = match cli.command {
        Command::Import {
            rows,
            mapping,
            root_title,
            flat,
        } => {
            let rows = rows_from_json(&std::fs::read_to_string(rows)?)?;
            let mapping: FieldMap = serde_json::from_str(&std::fs::read_to_string(mapping)?)?;
            if !rows.is_empty() {
                mapping.validate(header_columns(&rows))?;
            }
            let (root, report) = reconcile_with_report(&rows, &mapping, &root_title);
            if flat {
                json!({ "nodes": flatten(std::slice::from_ref(&root)), "report": report })
            } else {
                json!({ "tree": root, "report": report })
            }
        }
        Command::Layout { tree } => {
            let forest = read_forest(&tree)?;
            serde_json::to_value(layout_forest(&forest, &config.layout))?
        }
        Command::Search { tree, query } => {
            let forest = read_forest(&tree)?;
            let hits = SearchIndex::build(&forest, config.search.clone()).search(&query);
            serde_json::to_value(hits)?
        }
        Command::Version => json!({ "version": core_version() }),
    };

    info!("event=cli_done module=cli status=ok");
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_forest(path: &Path) -> Result<Vec<Node>, Box<dyn Error>> {
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Ok(forest_from_value(value)?)
}

/// Accepts one root node, an array of roots, or a flat node array.
///
/// An array whose nodes carry no `children` is treated as flat and
/// reassembled through `parentId`.
fn forest_from_value(value: serde_json::Value) -> Result<Vec<Node>, serde_json::Error> {
    if !value.is_array() {
        return Ok(vec![serde_json::from_value(value)?]);
    }
    let nodes: Vec<Node> = serde_json::from_value(value)?;
    if nodes.iter().all(|node| node.children.is_empty()) {
        Ok(build_forest(nodes))
    } else {
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::forest_from_value;
    use knowtree_core::{flatten, Node, NodeKind};

    #[test]
    fn flat_array_rebuilds_deep_tree() {
        let mut cursor = Node::new(NodeKind::Leaf, "bottom");
        for depth in 0..500 {
            cursor = Node::new(NodeKind::Folder, format!("level {depth}")).with_child(cursor);
        }
        let value = serde_json::to_value(flatten(std::slice::from_ref(&cursor))).unwrap();

        let forest = forest_from_value(value).unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, cursor.id);
        assert_eq!(forest[0].descendant_count(), 500);
    }

    #[test]
    fn nested_node_and_root_arrays_still_parse() {
        let tree = Node::new(NodeKind::Folder, "Course")
            .with_child(Node::new(NodeKind::Leaf, "Intro"));
        let single = forest_from_value(serde_json::to_value(&tree).unwrap()).unwrap();
        assert_eq!(single, vec![tree.clone()]);

        let roots = forest_from_value(serde_json::to_value(vec![tree.clone()]).unwrap()).unwrap();
        assert_eq!(roots[0].children[0].title, "Intro");
    }
}
