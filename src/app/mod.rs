//! Application layer with dependency injection container.
//!
//! The container owns the infrastructure (rules engine, tree store) and the
//! registry of live sessions. Domain code never reaches for an adapter
//! directly; it goes through the ports the container was built with.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │   App (sessions, one lock each)      │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                      │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - ShakmatyEngine                    │   │
//! │  │  - MsgPackStore / InMemoryStore      │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Ports: RulesEngine, TreeStore       │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                   │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain: MoveTree, Navigator,        │   │
//! │  │  MoveApplier, codec, validation      │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use movetree::app::{App, SessionConfig};
//! use movetree::adapters::InMemoryStore;
//! use movetree::tree::IdStrategy;
//!
//! let app = App::builder()
//!     .with_store(InMemoryStore::new())
//!     .with_config(SessionConfig::new().with_id_strategy(IdStrategy::Sequential))
//!     .build();
//! let session = app.start_session("8/8/8/8/8/8/8/K6k w - - 0 1")?;
//! assert_eq!(app.current(&session)?.ply, 0);
//! # Ok::<(), movetree::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::SessionConfig;
pub use container::{App, AppBuilder};
