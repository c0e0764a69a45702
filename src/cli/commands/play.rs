//! Play command - Grow a tree by playing moves through the rules engine
//!
//! Each token is one of:
//! - a coordinate move (`e2e4`, `e7e8q`) played from the cursor,
//! - `..` to step back to the parent,
//! - `@<node-id>` to jump to a node.
//!
//! Playing from a node that already has a continuation adds a variation.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    adapters::{InMemoryStore, MsgPackStore, ShakmatyEngine},
    app::App,
    cli::{commands::load_tree, config::CliConfig, output},
    codec,
    identifiers::{NodeId, SessionId, StorageRef},
    navigator::Step,
};

/// Standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Parser, Debug)]
#[command(about = "Play moves into a new or existing tree")]
pub struct PlayArgs {
    /// Move tokens: coordinate moves, `..` (back) or `@<id>` (jump)
    pub moves: Vec<String>,

    /// Continue an encoded tree (JSON); `-` reads stdin
    #[arg(long, short = 'i', conflicts_with_all = ["fen", "resume"])]
    pub input: Option<PathBuf>,

    /// Starting position for a new tree (FEN)
    #[arg(long, default_value = START_FEN)]
    pub fen: String,

    /// Persist the result into this MessagePack store directory
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Continue a tree kept in the store under this reference
    #[arg(long, requires = "store")]
    pub resume: Option<String>,

    /// Write the encoded tree to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Pretty-print the encoded tree
    #[arg(long)]
    pub pretty: bool,
}

/// One parsed command-line token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Move(String),
    Back,
    Jump(NodeId),
}

fn parse_token(raw: &str) -> Result<Token> {
    let raw = raw.trim();
    if raw == ".." {
        return Ok(Token::Back);
    }
    if let Some(id) = raw.strip_prefix('@') {
        if id.is_empty() {
            return Err(anyhow!("Jump token '@' needs a node id"));
        }
        return Ok(Token::Jump(NodeId::new(id)));
    }
    Ok(Token::Move(raw.to_string()))
}

pub fn execute(args: PlayArgs, config: &CliConfig) -> Result<()> {
    let tokens = args
        .moves
        .iter()
        .map(|raw| parse_token(raw))
        .collect::<Result<Vec<_>>>()?;

    let builder = App::builder()
        .with_engine(ShakmatyEngine::new())
        .with_config(config.session_config());
    let app = match &args.store {
        Some(dir) => builder.with_store(MsgPackStore::new(dir)).build(),
        None => builder.with_store(InMemoryStore::new()).build(),
    };

    let session = open(&app, &args, config)?;
    for token in &tokens {
        apply_token(&app, &session, token)?;
    }

    let cursor = app.current(&session)?;
    let tree = app.snapshot(&session)?;

    if args.store.is_some() {
        let reference = app.end_session(&session)?;
        output::print_kv("Stored as", reference.as_str());
    }

    let blob = if args.pretty {
        codec::encode_pretty(&tree)?
    } else {
        codec::encode(&tree)?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, blob + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output::print_kv("Wrote", &path.display().to_string());
        }
        None if args.store.is_none() => println!("{blob}"),
        None => {}
    }

    tracing::info!(nodes = tree.len(), cursor = %cursor.id, ply = cursor.ply, "play finished");
    Ok(())
}

fn open(app: &App, args: &PlayArgs, config: &CliConfig) -> Result<SessionId> {
    if let Some(reference) = &args.resume {
        return app
            .restore_session(&StorageRef::new(reference.as_str()))
            .with_context(|| format!("Failed to resume '{reference}'"));
    }
    if let Some(path) = &args.input {
        let tree = load_tree(path, config)?;
        return app
            .open_session(tree)
            .with_context(|| format!("{} is not a valid tree", path.display()));
    }
    Ok(app.start_session(&args.fen)?)
}

fn apply_token(app: &App, session: &SessionId, token: &Token) -> Result<()> {
    match token {
        Token::Move(code) => {
            let request = code.parse()?;
            let node = app.play_at_cursor(session, &request)?;
            tracing::debug!(node = %node.id, san = node.san.as_deref().unwrap_or(""), "played");
        }
        Token::Back => {
            if app.back(session)? == Step::AtRoot {
                tracing::warn!("'..' at the root has no effect");
            }
        }
        Token::Jump(id) => {
            app.goto(session, id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens() {
        assert_eq!(parse_token("..").unwrap(), Token::Back);
        assert_eq!(parse_token("@n3").unwrap(), Token::Jump(NodeId::new("n3")));
        assert_eq!(parse_token("e2e4").unwrap(), Token::Move("e2e4".to_string()));
        assert!(parse_token("@").is_err());
    }
}
