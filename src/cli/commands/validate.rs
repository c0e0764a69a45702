//! Validate command - Check an encoded tree against every structural invariant

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use crate::{
    cli::{commands::load_tree, config::CliConfig, output},
    validation,
};

#[derive(Parser, Debug)]
#[command(about = "Validate an encoded move tree")]
pub struct ValidateArgs {
    /// Encoded tree (JSON); `-` reads stdin
    pub input: PathBuf,

    /// Print the report as JSON (`{"valid": .., "errors": [..]}`)
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ValidateArgs, config: &CliConfig) -> Result<()> {
    let tree = load_tree(&args.input, config)?;
    let report = validation::validate(&tree);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_section(&format!("Validation: {}", args.input.display()));
        output::print_kv("Nodes", &output::format_number(tree.len()));
        output::print_kv("Valid", if report.is_valid() { "yes" } else { "no" });
        if !report.is_valid() {
            output::print_subsection("Violations");
            for error in report.errors() {
                println!("  - {error}");
            }
        }
    }

    if !report.is_valid() {
        bail!(
            "{} has {} invariant violation(s)",
            args.input.display(),
            report.violations().len()
        );
    }
    Ok(())
}
