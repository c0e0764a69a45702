//! CLI infrastructure for the movetree toolkit
//!
//! This module provides the command-line interface for validating, inspecting,
//! extending and exporting encoded move trees.

pub mod commands;
pub mod config;
pub mod output;
