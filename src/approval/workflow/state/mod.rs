// SPDX-License-Identifier: MIT

//! State management for approval runs
//!
//! This module provides:
//! - `WorkflowState` - the write-once record threaded through a run
//! - `StateUpdate` - the partial set of fields a single step produces

mod store;

pub use store::{StateUpdate, WorkflowState};
