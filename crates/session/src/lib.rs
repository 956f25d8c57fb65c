//! Game session for the search AI
//!
//! This crate provides:
//! - The turn/player-type state machine ([`GameOrchestrator`])
//! - TOML session configuration with learned-evaluator fallback
//! - A self-play match runner
//!
//! # Usage
//!
//! ```bash
//! # Play White against the search AI
//! cargo run -p game_session -- play --black search_ai --depth 3
//!
//! # Let two AIs play each other
//! cargo run -p game_session -- selfplay --white random_ai --black search_ai --games 20
//!
//! # Write a synthetic training set
//! cargo run -p game_session -- gen-data --samples 5000 --out data.json
//! ```

mod config;
mod match_runner;
mod orchestrator;
mod player;

pub use config::*;
pub use match_runner::*;
pub use orchestrator::*;
pub use player::*;
