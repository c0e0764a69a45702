//! Export command - Export a tree's nodes in various formats

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::{
    cli::{commands::load_tree, config::CliConfig},
    codec,
    tree::{MoveNode, MoveTree},
};

#[derive(Parser, Debug)]
#[command(about = "Export a tree in various formats")]
pub struct ExportArgs {
    /// Encoded tree (JSON); `-` reads stdin
    pub input: PathBuf,

    /// Output file path (stdout when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(long, short = 'f', value_enum, default_value = "csv")]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// One row per node
    Csv,
    /// Canonical wire encoding, pretty-printed
    Json,
    /// One JSON object per node
    Jsonl,
    /// Graphviz digraph
    Dot,
}

/// Flat per-node record shared by the CSV and JSONL exports.
#[derive(Debug, Serialize)]
struct NodeRow<'a> {
    id: &'a str,
    parent_id: Option<&'a str>,
    ply: u32,
    san: Option<&'a str>,
    uci: Option<String>,
    fen: &'a str,
    children: usize,
    /// Whether the node is its parent's first child (or the root)
    mainline: bool,
}

impl<'a> NodeRow<'a> {
    fn new(tree: &'a MoveTree, node: &'a MoveNode) -> Self {
        let mainline = match &node.parent_id {
            None => true,
            Some(parent) => tree
                .get(parent)
                .and_then(MoveNode::mainline_child)
                .is_some_and(|first| *first == node.id),
        };
        Self {
            id: node.id.as_str(),
            parent_id: node.parent_id.as_ref().map(|p| p.as_str()),
            ply: node.ply,
            san: node.san.as_deref(),
            uci: node.move_code.map(|code| code.to_string()),
            fen: &node.position,
            children: node.children.len(),
            mainline,
        }
    }
}

fn rows(tree: &MoveTree) -> impl Iterator<Item = NodeRow<'_>> {
    tree.sorted_ids()
        .into_iter()
        .filter_map(|id| tree.get(id))
        .map(|node| NodeRow::new(tree, node))
}

pub fn execute(args: ExportArgs, config: &CliConfig) -> Result<()> {
    let tree = load_tree(&args.input, config)?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(sink);

    match args.format {
        ExportFormat::Csv => write_csv(&tree, &mut writer)?,
        ExportFormat::Json => writeln!(writer, "{}", codec::encode_pretty(&tree)?)?,
        ExportFormat::Jsonl => write_jsonl(&tree, &mut writer)?,
        ExportFormat::Dot => write_dot(&tree, &mut writer)?,
    }
    writer.flush()?;

    tracing::info!(nodes = tree.len(), format = ?args.format, "exported tree");
    Ok(())
}

fn write_csv<W: Write>(tree: &MoveTree, out: W) -> crate::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows(tree) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_jsonl<W: Write>(tree: &MoveTree, mut out: W) -> Result<()> {
    for row in rows(tree) {
        serde_json::to_writer(&mut out, &row)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_dot<W: Write>(tree: &MoveTree, mut out: W) -> Result<()> {
    writeln!(out, "digraph movetree {{")?;
    for row in rows(tree) {
        let label = row.san.unwrap_or("start");
        let style = if row.mainline { "solid" } else { "dashed" };
        writeln!(out, "  \"{}\" [label=\"{}\"];", row.id, label)?;
        if let Some(parent) = row.parent_id {
            writeln!(out, "  \"{parent}\" -> \"{}\" [style={style}];", row.id)?;
        }
    }
    writeln!(out, "}}")?;
    Ok(())
}
