// SPDX-License-Identifier: MIT

//! Run events for observers
//!
//! The orchestrator emits events while it runs; what to do with them
//! (render an activity log, stream them, ignore them) is up to the caller.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::approval::workflow::state::StateUpdate;
use crate::approval::workflow::steps::StepId;

/// Events emitted during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// A run has started
    RunStarted { run_id: String, project_id: String },

    /// A step has started executing
    StepStarted { run_id: String, step: StepId },

    /// A step has completed and its update was merged into the state
    StepCompleted {
        run_id: String,
        step: StepId,
        update: StateUpdate,
    },

    /// A step has failed; the run is aborting
    StepFailed {
        run_id: String,
        step: StepId,
        error: String,
    },

    /// The run reached the summary step
    RunCompleted { run_id: String, approved: bool },

    /// The run aborted without a result
    RunFailed { run_id: String, error: String },
}

impl RunEvent {
    pub fn run_id(&self) -> &str {
        match self {
            RunEvent::RunStarted { run_id, .. }
            | RunEvent::StepStarted { run_id, .. }
            | RunEvent::StepCompleted { run_id, .. }
            | RunEvent::StepFailed { run_id, .. }
            | RunEvent::RunCompleted { run_id, .. }
            | RunEvent::RunFailed { run_id, .. } => run_id,
        }
    }

    /// The step this event concerns, if any
    pub fn step(&self) -> Option<StepId> {
        match self {
            RunEvent::StepStarted { step, .. }
            | RunEvent::StepCompleted { step, .. }
            | RunEvent::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Sends events for one run to an optional channel
pub(crate) struct EventSink {
    run_id: String,
    tx: Option<mpsc::Sender<RunEvent>>,
}

impl EventSink {
    pub(crate) fn new(run_id: String, tx: Option<mpsc::Sender<RunEvent>>) -> Self {
        Self { run_id, tx }
    }

    pub(crate) fn run_id(&self) -> &str {
        &self.run_id
    }

    pub(crate) async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(event).await;
        }
    }

    pub(crate) async fn step_started(&self, step: StepId) {
        self.emit(RunEvent::StepStarted {
            run_id: self.run_id.clone(),
            step,
        })
        .await;
    }

    pub(crate) async fn step_failed(
        &self,
        step: StepId,
        error: &(dyn std::fmt::Display + Sync),
    ) {
        self.emit(RunEvent::StepFailed {
            run_id: self.run_id.clone(),
            step,
            error: error.to_string(),
        })
        .await;
    }
}
