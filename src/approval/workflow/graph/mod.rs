// SPDX-License-Identifier: MIT

//! Graph-based approval execution
//!
//! This module provides the orchestrator that runs the steps in
//! dependency order, fanning out to the two checks and joining them
//! before the decision.

mod events;
pub mod executor;
pub mod types;

pub use events::RunEvent;
pub use executor::Orchestrator;
pub use types::{depends_on, is_join_point, is_terminal, successors, FanOutMode};
