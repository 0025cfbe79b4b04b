// SPDX-License-Identifier: MIT

pub mod approval;
pub mod error;

pub use error::{ApprovalError, Result, WorkflowError};
