//! Subcommands of the `movetree` binary

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::{Context, Result};

use crate::{cli::config::CliConfig, codec, tree::MoveTree};

pub mod export;
pub mod inspect;
pub mod play;
pub mod validate;

/// Read a whole input file; `-` reads standard input.
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read tree from stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read and decode a tree without validating it.
pub(crate) fn load_tree(path: &Path, config: &CliConfig) -> Result<MoveTree> {
    let input = read_input(path)?;
    codec::decode_with(&input, &config.decode_options())
        .with_context(|| format!("Failed to decode {}", path.display()))
}
