// SPDX-License-Identifier: MIT

pub mod graph;
pub mod state;
pub mod steps;
pub mod types;

pub use graph::{FanOutMode, Orchestrator, RunEvent};
pub use state::{StateUpdate, WorkflowState};
pub use steps::{Step, StepId};
pub use types::{ApprovalRequest, ApprovalResponse};
