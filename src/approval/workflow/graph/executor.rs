// SPDX-License-Identifier: MIT

//! Approval graph executor

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::{EventSink, RunEvent};
use super::types::{depends_on, FanOutMode};
use crate::approval::config::CompliancePolicy;
use crate::approval::records::RecordStore;
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::steps::{
    BudgetCheckStep, ComplianceCheckStep, DecisionStep, IntakeStep, RetrievalStep, Step, StepId,
    SummaryStep, VarianceStep,
};
use crate::approval::workflow::types::{ApprovalRequest, ApprovalResponse};
use crate::error::{Result, WorkflowError};

/// Drives one approval request through the static step graph
///
/// Each call to `run` starts from a fresh `WorkflowState`; the orchestrator
/// itself holds no per-run state, so one instance can serve concurrent runs.
pub struct Orchestrator {
    steps: HashMap<StepId, Arc<dyn Step>>,
    fan_out: FanOutMode,
}

impl Orchestrator {
    /// Build the standard graph over a record store and compliance policy
    pub fn new(store: Arc<dyn RecordStore>, policy: CompliancePolicy) -> Self {
        let steps: Vec<Arc<dyn Step>> = vec![
            Arc::new(IntakeStep),
            Arc::new(RetrievalStep::new(store.clone())),
            Arc::new(BudgetCheckStep),
            Arc::new(ComplianceCheckStep::new(policy)),
            Arc::new(DecisionStep),
            Arc::new(VarianceStep::new(store)),
            Arc::new(SummaryStep),
        ];

        Self {
            steps: steps.into_iter().map(|s| (s.id(), s)).collect(),
            fan_out: FanOutMode::default(),
        }
    }

    pub fn with_fan_out(mut self, fan_out: FanOutMode) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Replace the implementation of one step
    pub fn with_step(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.insert(step.id(), step);
        self
    }

    pub fn fan_out(&self) -> FanOutMode {
        self.fan_out
    }

    /// Run the workflow for one request
    pub async fn run(&self, request: ApprovalRequest) -> Result<ApprovalResponse> {
        self.run_stream(request, None).await
    }

    /// Run the workflow, streaming events to `tx`
    ///
    /// Any step failure aborts the run: no partial response is returned and
    /// the summary step never runs.
    pub async fn run_stream(
        &self,
        request: ApprovalRequest,
        tx: Option<mpsc::Sender<RunEvent>>,
    ) -> Result<ApprovalResponse> {
        let sink = EventSink::new(Uuid::new_v4().to_string(), tx);
        log::info!(
            "Run {} started for project {}",
            sink.run_id(),
            request.project_id
        );
        sink.emit(RunEvent::RunStarted {
            run_id: sink.run_id().to_string(),
            project_id: request.project_id.clone(),
        })
        .await;

        match self.execute(&request, &sink).await {
            Ok(response) => {
                log::info!(
                    "Run {} completed: approved={}",
                    sink.run_id(),
                    response.approved
                );
                sink.emit(RunEvent::RunCompleted {
                    run_id: sink.run_id().to_string(),
                    approved: response.approved,
                })
                .await;
                Ok(response)
            }
            Err(e) => {
                log::error!("Run {} failed: {}", sink.run_id(), e);
                sink.emit(RunEvent::RunFailed {
                    run_id: sink.run_id().to_string(),
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    /// Steps whose dependencies have all completed
    fn ready_steps(&self, completed: &HashSet<StepId>) -> Vec<StepId> {
        StepId::ALL
            .into_iter()
            .filter(|id| !completed.contains(id))
            .filter(|id| depends_on(*id).iter().all(|d| completed.contains(d)))
            .collect()
    }

    async fn execute(&self, request: &ApprovalRequest, sink: &EventSink) -> Result<ApprovalResponse> {
        let mut state = WorkflowState::empty();
        let mut completed: HashSet<StepId> = HashSet::new();

        loop {
            let mut ready = self.ready_steps(&completed);
            if ready.is_empty() {
                break;
            }
            self.fan_out.order(&mut ready);
            log::debug!("Run {}: ready {:?}", sink.run_id(), ready);

            if ready.len() > 1 && self.fan_out.is_parallel() {
                let updates = self.run_concurrently(&ready, request, &state, sink).await?;
                for (id, update) in updates {
                    self.commit(id, update, &mut state, sink).await?;
                    completed.insert(id);
                }
            } else {
                for id in ready {
                    let update = self.run_step(id, request, &state, sink).await?;
                    self.commit(id, update, &mut state, sink).await?;
                    completed.insert(id);
                }
            }
        }

        let pending: Vec<StepId> = StepId::ALL
            .into_iter()
            .filter(|id| !completed.contains(id))
            .collect();
        if !pending.is_empty() {
            return Err(WorkflowError::Incomplete { pending }.into());
        }

        Ok(ApprovalResponse::try_from(state)?)
    }

    /// Execute a single step against the current state
    async fn run_step(
        &self,
        id: StepId,
        request: &ApprovalRequest,
        state: &WorkflowState,
        sink: &EventSink,
    ) -> Result<StateUpdate> {
        log::info!("Executing step: {}", id);
        sink.step_started(id).await;

        let step = &self.steps[&id];
        match step.run(request, state).await {
            Ok(update) => Ok(update),
            Err(e) => {
                log::error!("Step {} failed: {}", id, e);
                sink.step_failed(id, &e).await;
                Err(e)
            }
        }
    }

    /// Execute sibling steps as independent tasks over one state snapshot
    ///
    /// Results come back in batch order, so a failure in the first sibling is
    /// the one reported when several fail.
    async fn run_concurrently(
        &self,
        batch: &[StepId],
        request: &ApprovalRequest,
        state: &WorkflowState,
        sink: &EventSink,
    ) -> Result<Vec<(StepId, StateUpdate)>> {
        let mut handles = Vec::with_capacity(batch.len());
        for id in batch {
            log::info!("Executing step: {} (fan-out)", id);
            sink.step_started(*id).await;

            let step = self.steps[id].clone();
            let request = request.clone();
            let snapshot = state.clone();
            handles.push(tokio::spawn(
                async move { step.run(&request, &snapshot).await },
            ));
        }

        let results = futures::future::join_all(handles).await;

        let mut updates = Vec::with_capacity(batch.len());
        for (id, joined) in batch.iter().zip(results) {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    let err = WorkflowError::Join(e.to_string());
                    sink.step_failed(*id, &err).await;
                    return Err(err.into());
                }
            };
            match outcome {
                Ok(update) => updates.push((*id, update)),
                Err(e) => {
                    log::error!("Step {} failed: {}", id, e);
                    sink.step_failed(*id, &e).await;
                    return Err(e);
                }
            }
        }
        Ok(updates)
    }

    /// Merge a step's update into the state and announce it
    async fn commit(
        &self,
        id: StepId,
        update: StateUpdate,
        state: &mut WorkflowState,
        sink: &EventSink,
    ) -> Result<()> {
        if let Err(e) = state.apply(update.clone()) {
            log::error!("Step {} produced a conflicting update: {}", id, e);
            sink.step_failed(id, &e).await;
            return Err(e.into());
        }

        log::info!("Step {} completed", id);
        sink.emit(RunEvent::StepCompleted {
            run_id: sink.run_id().to_string(),
            step: id,
            update,
        })
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::records::{InMemoryRecordStore, PurchaseOrderRecord};
    use crate::approval::workflow::steps::{BUDGET_EXCEEDED, COMPLIANCE_ISSUE};
    use crate::error::ApprovalError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn orchestrator() -> Orchestrator {
        let store = Arc::new(InMemoryRecordStore::sample());
        let policy = CompliancePolicy::new(["VendorY"]).unwrap();
        Orchestrator::new(store, policy)
    }

    async fn collect_events(
        orchestrator: &Orchestrator,
        project_id: &str,
    ) -> (Result<ApprovalResponse>, Vec<RunEvent>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = orchestrator
            .run_stream(ApprovalRequest::new(project_id), Some(tx))
            .await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (result, events)
    }

    /// Step that writes a field owned by another step
    struct RogueVarianceStep;

    #[async_trait]
    impl Step for RogueVarianceStep {
        fn id(&self) -> StepId {
            StepId::VarianceAnalysis
        }

        async fn run(&self, _: &ApprovalRequest, _: &WorkflowState) -> Result<StateUpdate> {
            Ok(StateUpdate {
                approved: Some(true),
                variance: Some(0.0),
                ..Default::default()
            })
        }
    }

    /// Budget check that counts its invocations and returns a fixed verdict
    struct CountingBudgetStep {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Step for CountingBudgetStep {
        fn id(&self) -> StepId {
            StepId::BudgetCheck
        }

        async fn run(&self, _: &ApprovalRequest, _: &WorkflowState) -> Result<StateUpdate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StateUpdate {
                budget_ok: Some(true),
                ..Default::default()
            })
        }
    }

    /// Budget check that skips writing its field
    struct SilentBudgetStep;

    #[async_trait]
    impl Step for SilentBudgetStep {
        fn id(&self) -> StepId {
            StepId::BudgetCheck
        }

        async fn run(&self, _: &ApprovalRequest, _: &WorkflowState) -> Result<StateUpdate> {
            Ok(StateUpdate::default())
        }
    }

    struct PanickingComplianceStep;

    #[async_trait]
    impl Step for PanickingComplianceStep {
        fn id(&self) -> StepId {
            StepId::ComplianceCheck
        }

        async fn run(&self, _: &ApprovalRequest, _: &WorkflowState) -> Result<StateUpdate> {
            panic!("compliance service exploded");
        }
    }

    #[test]
    fn test_ready_steps_follow_topology() {
        let orchestrator = orchestrator();
        let mut completed = HashSet::new();
        assert_eq!(orchestrator.ready_steps(&completed), vec![StepId::Intake]);

        completed.insert(StepId::Intake);
        completed.insert(StepId::DataRetrieval);
        assert_eq!(
            orchestrator.ready_steps(&completed),
            vec![StepId::BudgetCheck, StepId::ComplianceCheck]
        );

        // Decision waits for both checks
        completed.insert(StepId::BudgetCheck);
        assert_eq!(
            orchestrator.ready_steps(&completed),
            vec![StepId::ComplianceCheck]
        );

        completed.insert(StepId::ComplianceCheck);
        assert_eq!(orchestrator.ready_steps(&completed), vec![StepId::Decision]);
    }

    #[tokio::test]
    async fn test_scenario_approved() {
        let response = orchestrator()
            .run(ApprovalRequest::new("P0001"))
            .await
            .unwrap();

        assert!(response.approved);
        assert!(response.reason.is_none());
        assert_eq!(response.variance, Some(0.05));
        assert_eq!(response.cost_center.as_deref(), Some("IT-001"));
    }

    #[tokio::test]
    async fn test_scenario_budget_takes_precedence() {
        let response = orchestrator()
            .run(ApprovalRequest::new("P0002"))
            .await
            .unwrap();

        assert!(!response.approved);
        assert_eq!(response.reason.as_deref(), Some(BUDGET_EXCEEDED));
        assert_eq!(response.summary, "PO rejected: Budget exceeded");
    }

    #[tokio::test]
    async fn test_scenario_compliance_issue() {
        let response = orchestrator()
            .run(ApprovalRequest::new("P0003"))
            .await
            .unwrap();

        assert!(!response.approved);
        assert_eq!(response.reason.as_deref(), Some(COMPLIANCE_ISSUE));
        // Rejection does not short-circuit variance analysis
        assert_eq!(response.variance, Some(0.02));
    }

    #[tokio::test]
    async fn test_fan_out_modes_agree() {
        for project_id in ["P0001", "P0002", "P0003"] {
            let mut responses = Vec::new();
            for mode in [
                FanOutMode::Parallel,
                FanOutMode::BudgetFirst,
                FanOutMode::ComplianceFirst,
            ] {
                let response = orchestrator()
                    .with_fan_out(mode)
                    .run(ApprovalRequest::new(project_id))
                    .await
                    .unwrap();
                responses.push(response);
            }
            assert_eq!(responses[0], responses[1], "{}", project_id);
            assert_eq!(responses[1], responses[2], "{}", project_id);
        }
    }

    #[tokio::test]
    async fn test_sequential_fan_out_order_is_observable() {
        let orchestrator = orchestrator().with_fan_out(FanOutMode::ComplianceFirst);
        let (_, events) = collect_events(&orchestrator, "P0001").await;

        let started: Vec<StepId> = events
            .iter()
            .filter(|e| matches!(e, RunEvent::StepStarted { .. }))
            .filter_map(|e| e.step())
            .collect();
        assert_eq!(
            started,
            vec![
                StepId::Intake,
                StepId::DataRetrieval,
                StepId::ComplianceCheck,
                StepId::BudgetCheck,
                StepId::Decision,
                StepId::VarianceAnalysis,
                StepId::Summary,
            ]
        );
    }

    #[tokio::test]
    async fn test_idempotent_runs() {
        let orchestrator = orchestrator();
        let first = orchestrator.run(ApprovalRequest::new("P0002")).await.unwrap();
        let second = orchestrator.run(ApprovalRequest::new("P0002")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_not_found_aborts_before_summary() {
        let orchestrator = orchestrator();
        let (result, events) = collect_events(&orchestrator, "P9999").await;

        assert!(result.unwrap_err().is_not_found());
        assert!(matches!(
            events.last(),
            Some(RunEvent::RunFailed { .. })
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            RunEvent::StepFailed {
                step: StepId::DataRetrieval,
                ..
            }
        )));
        assert!(!events.iter().any(|e| e.step() == Some(StepId::Summary)));
        assert!(!events
            .iter()
            .any(|e| matches!(e, RunEvent::RunCompleted { .. })));
    }

    #[tokio::test]
    async fn test_event_stream_for_completed_run() {
        let orchestrator = orchestrator();
        let (result, events) = collect_events(&orchestrator, "P0001").await;
        assert!(result.is_ok());

        assert!(matches!(
            events.first(),
            Some(RunEvent::RunStarted { project_id, .. }) if project_id == "P0001"
        ));
        assert!(matches!(
            events.last(),
            Some(RunEvent::RunCompleted { approved: true, .. })
        ));

        let completed = events
            .iter()
            .filter(|e| matches!(e, RunEvent::StepCompleted { .. }))
            .count();
        assert_eq!(completed, StepId::ALL.len());

        let run_id = events[0].run_id();
        assert!(events.iter().all(|e| e.run_id() == run_id));
    }

    #[tokio::test]
    async fn test_each_run_gets_its_own_id() {
        let orchestrator = orchestrator();
        let (_, first) = collect_events(&orchestrator, "P0001").await;
        let (_, second) = collect_events(&orchestrator, "P0001").await;
        assert_ne!(first[0].run_id(), second[0].run_id());
    }

    #[tokio::test]
    async fn test_write_once_violation_aborts_run() {
        let orchestrator = orchestrator().with_step(Arc::new(RogueVarianceStep));
        let err = orchestrator
            .run(ApprovalRequest::new("P0001"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApprovalError::Workflow(WorkflowError::FieldAlreadySet { field: "approved" })
        ));
    }

    #[tokio::test]
    async fn test_missing_check_output_is_precondition_violation() {
        let orchestrator = orchestrator().with_step(Arc::new(SilentBudgetStep));
        let err = orchestrator
            .run(ApprovalRequest::new("P0001"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApprovalError::PreconditionViolation {
                step: StepId::Decision,
                field: "budget_ok"
            }
        ));
    }

    #[tokio::test]
    async fn test_replaced_step_runs_once_per_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = orchestrator().with_step(Arc::new(CountingBudgetStep {
            calls: calls.clone(),
        }));

        // P0002 exceeds its budget, but the replacement always passes it
        let response = orchestrator
            .run(ApprovalRequest::new("P0002"))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.reason.as_deref(), Some(COMPLIANCE_ISSUE));
    }

    #[tokio::test]
    async fn test_panicking_branch_reports_join_error() {
        let orchestrator = orchestrator().with_step(Arc::new(PanickingComplianceStep));
        let err = orchestrator
            .run(ApprovalRequest::new("P0001"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::Workflow(WorkflowError::Join(_))));
    }

    #[tokio::test]
    async fn test_invalid_numeric_column_fails_run() {
        let store = Arc::new(InMemoryRecordStore::new(vec![PurchaseOrderRecord {
            po_requested: "lots".into(),
            ..PurchaseOrderRecord::new("P0100", 0.0, "IT-001", "VendorX", 100.0, 0.0)
        }]));
        let orchestrator = Orchestrator::new(store, CompliancePolicy::default());

        let err = orchestrator
            .run(ApprovalRequest::new("P0100"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::InvalidField {
                field: "po_requested",
                ..
            }
        ));
    }
}
