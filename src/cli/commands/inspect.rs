//! Inspect command - Summarize a tree and show lines of play

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::{commands::load_tree, config::CliConfig, output},
    identifiers::NodeId,
    tree::{MoveNode, MoveTree, TreeStats},
};

#[derive(Parser, Debug)]
#[command(about = "Summarize an encoded move tree")]
pub struct InspectArgs {
    /// Encoded tree (JSON); `-` reads stdin
    pub input: PathBuf,

    /// Show the line from the root to this node
    #[arg(long)]
    pub node: Option<String>,

    /// List every variation branching off the mainline
    #[arg(long)]
    pub variations: bool,

    /// Print the statistics as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: InspectArgs, config: &CliConfig) -> Result<()> {
    let tree = load_tree(&args.input, config)?;
    let stats = TreeStats::collect(&tree);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    output::print_section(&format!("Move tree: {}", args.input.display()));
    output::print_stats_table(&[
        ("Root", tree.root_id().to_string()),
        ("Nodes", output::format_number(stats.nodes)),
        ("Reachable", output::format_number(stats.reachable)),
        ("Leaves", output::format_number(stats.leaves)),
        ("Variations", output::format_number(stats.variations)),
        ("Depth", stats.depth.to_string()),
        ("Max ply", stats.max_ply.to_string()),
    ]);

    let mainline = tree.mainline(tree.root_id())?;
    output::print_subsection("Mainline");
    println!("  {}", render(&mainline));

    if args.variations {
        output::print_subsection("Variations");
        for (branch_point, child) in side_lines(&tree, &mainline) {
            let mut line = vec![branch_point];
            line.extend(tree.mainline(&child.id)?);
            println!("  [{}] {}", child.id, render(&line));
        }
    }

    if let Some(node) = args.node {
        let path = tree.get_path(&NodeId::new(node.clone()))?;
        output::print_subsection(&format!("Line to {node}"));
        println!("  {}", render(&path));
        if let Some(last) = path.last() {
            output::print_kv("Position", &last.position);
        }
    }

    Ok(())
}

/// Children beyond the first at each mainline node, paired with that node.
fn side_lines<'a>(tree: &'a MoveTree, mainline: &[&'a MoveNode]) -> Vec<(&'a MoveNode, &'a MoveNode)> {
    mainline
        .iter()
        .flat_map(|node| {
            node.children
                .iter()
                .skip(1)
                .filter_map(|id| tree.get(id))
                .map(move |child| (*node, child))
        })
        .collect()
}

/// Numbered move text for a line whose first node is its starting position.
fn render(line: &[&MoveNode]) -> String {
    let sans: Vec<&str> = line
        .iter()
        .skip(1)
        .map(|node| node.san.as_deref().unwrap_or("?"))
        .collect();
    match line.first() {
        Some(start) if !sans.is_empty() => {
            let clock = output::MoveClock::for_position(&start.position, start.ply);
            output::format_line(clock, &sans)
        }
        _ => "(no moves)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MoveRecord;

    #[test]
    fn render_numbers_from_a_black_to_move_root() {
        let mut tree =
            MoveTree::new("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        let root = tree.root_id().clone();
        let e5 = tree
            .add_child(&root, MoveRecord::new("after e5").with_san("e5"))
            .unwrap();
        tree.add_child(&e5, MoveRecord::new("after Nf3").with_san("Nf3"))
            .unwrap();

        let line = tree.mainline(&root).unwrap();
        assert_eq!(render(&line), "1... e5 2. Nf3");
        assert_eq!(render(&line[..1]), "(no moves)");
    }
}
