//! Ready-queue scheduler for concurrent score execution.
//!
//! The scheduler drains a per-run dependency graph: scores whose
//! dependencies are all terminal are enqueued FIFO, dispatched onto the
//! runtime, and their completions unlock downstream scores. Dispatch is
//! serialized by the loop; the predictions themselves overlap in flight.
//! Run state (`outcomes`, `remaining`, the ready queue) is mutated only by
//! this loop - workers communicate exclusively through their return values.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Prediction, ScoreGraph, ScoreOutcome, ScoreResult, SkipReason, CODE_EXECUTION_FAILED,
};
use crate::services::conditions;

/// What to do when a prediction returns an unexpected error.
///
/// The conservative alternative (`FailFast`) aborts the whole run; the
/// default records a degraded outcome for the failing score and keeps
/// independent subtrees running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Record `Errored` for the failing score and continue siblings.
    #[default]
    ContinueDegraded,
    /// Abort the run on the first failing score, returning the outcomes
    /// reached so far.
    FailFast,
}

/// Per-run scheduler options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub error_policy: ErrorPolicy,
    /// Upper bound on concurrently in-flight predictions. `None` means
    /// unbounded fan-out.
    pub max_concurrency: Option<usize>,
}

/// Boxed prediction future produced by the execute callback.
pub type ExecuteFuture = BoxFuture<'static, DomainResult<Prediction>>;

/// Terminal failure modes of a run.
///
/// Both in-run variants carry every outcome that reached a terminal state
/// before the abort, so callers can inspect partial progress and seed a
/// follow-up run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A score raised a cooperative pause; the run cannot finish until the
    /// external continuation completes. Resumption is caller-orchestrated.
    #[error("score '{score_id}' suspended awaiting continuation '{token}'")]
    Suspended {
        score_id: String,
        token: String,
        outcomes: HashMap<String, ScoreOutcome>,
    },

    /// A prediction failed under `ErrorPolicy::FailFast`.
    #[error("score '{score_id}' failed: {message}")]
    ScoreFailed {
        score_id: String,
        message: String,
        outcomes: HashMap<String, ScoreOutcome>,
    },

    /// The run could not start (registry failure, dependency cycle).
    #[error(transparent)]
    Setup(#[from] DomainError),
}

impl RunError {
    /// Outcomes recorded before the run unwound, when any.
    pub fn outcomes(&self) -> Option<&HashMap<String, ScoreOutcome>> {
        match self {
            Self::Suspended { outcomes, .. } | Self::ScoreFailed { outcomes, .. } => {
                Some(outcomes)
            }
            Self::Setup(_) => None,
        }
    }
}

/// The ready-queue execution engine.
#[derive(Debug, Clone, Default)]
pub struct ReadyQueueScheduler {
    options: RunOptions,
}

impl ReadyQueueScheduler {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Drain `graph` to completion or to a pause/error boundary.
    ///
    /// `seeds` pre-populates the outcome map: degraded placeholders for
    /// disabled or unregistered scores, and prior terminal outcomes when a
    /// caller resumes after a suspension. Seeded scores are never
    /// re-executed.
    ///
    /// `execute` receives the score id and the completed results of its
    /// dependencies keyed by dependency id; skipped dependencies carry no
    /// payload and are absent from the map.
    #[instrument(skip_all, fields(nodes = graph.len(), seeds = seeds.len()))]
    pub async fn run<F>(
        &self,
        graph: &ScoreGraph,
        seeds: HashMap<String, ScoreOutcome>,
        execute: F,
    ) -> Result<HashMap<String, ScoreOutcome>, RunError>
    where
        F: Fn(String, HashMap<String, ScoreResult>) -> ExecuteFuture + Send + Sync,
    {
        let mut outcomes = seeds;
        let mut remaining: HashSet<String> = graph
            .ids()
            .filter(|id| !outcomes.contains_key(*id))
            .map(str::to_string)
            .collect();

        // Initial frontier: scores whose dependencies (if any) are already
        // terminal, in graph insertion order.
        let mut ready: VecDeque<String> = VecDeque::new();
        let mut enqueued: HashSet<String> = HashSet::new();
        for node in graph.nodes_in_order() {
            if remaining.contains(&node.id)
                && node.deps.iter().all(|dep| outcomes.contains_key(dep))
            {
                enqueued.insert(node.id.clone());
                ready.push_back(node.id.clone());
            }
        }

        let semaphore = self
            .options
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let mut in_flight: JoinSet<(String, DomainResult<Prediction>)> = JoinSet::new();

        loop {
            // Dispatch phase: drain the ready queue. Skips re-feed the
            // queue directly, so this inner loop handles whole pruned
            // subtrees without touching the runtime.
            while let Some(id) = ready.pop_front() {
                let Some(node) = graph.node(&id) else {
                    continue;
                };

                if !conditions::conditions_satisfied(node, &outcomes) {
                    debug!(score_id = %id, "conditions unsatisfied, skipping");
                    record(
                        &mut outcomes,
                        &mut remaining,
                        id.clone(),
                        ScoreOutcome::Skipped {
                            reason: SkipReason::ConditionsUnsatisfied,
                        },
                    );
                    enqueue_ready_dependents(
                        graph,
                        &id,
                        &outcomes,
                        &remaining,
                        &mut enqueued,
                        &mut ready,
                    );
                    continue;
                }

                let dep_results: HashMap<String, ScoreResult> = node
                    .deps
                    .iter()
                    .filter_map(|dep| {
                        outcomes
                            .get(dep)
                            .and_then(ScoreOutcome::result)
                            .map(|result| (dep.clone(), result.clone()))
                    })
                    .collect();

                let future = execute(id.clone(), dep_results);
                // Never closed, so acquisition only parks until a permit
                // frees up.
                let permit = match &semaphore {
                    Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                    None => None,
                };

                debug!(score_id = %id, "dispatching prediction");
                in_flight.spawn(async move {
                    let _permit = permit;
                    let result = match AssertUnwindSafe(future).catch_unwind().await {
                        Ok(result) => result,
                        Err(panic) => Err(DomainError::PredictionFailed(panic_message(&panic))),
                    };
                    (id, result)
                });
            }

            if remaining.is_empty() {
                break;
            }

            // Completion phase: incorporate exactly one finished prediction,
            // then go back to dispatching whatever it unlocked.
            let Some(joined) = in_flight.join_next().await else {
                // Nothing in flight, nothing ready, scores left over. An
                // acyclic graph cannot reach this; degrade instead of
                // hanging the run.
                warn!(
                    stalled = remaining.len(),
                    "scheduler stalled with unrunnable scores"
                );
                for id in remaining.drain() {
                    outcomes.entry(id).or_insert_with(|| {
                        ScoreOutcome::errored(
                            CODE_EXECUTION_FAILED,
                            "score never became runnable",
                        )
                    });
                }
                break;
            };

            let (id, result) = match joined {
                Ok(pair) => pair,
                Err(join_error) => {
                    warn!(error = %join_error, "prediction worker aborted");
                    continue;
                }
            };

            match result {
                Ok(Prediction::Completed { result }) => {
                    debug!(score_id = %id, "prediction completed");
                    record(
                        &mut outcomes,
                        &mut remaining,
                        id.clone(),
                        ScoreOutcome::Completed { result },
                    );
                    enqueue_ready_dependents(
                        graph,
                        &id,
                        &outcomes,
                        &remaining,
                        &mut enqueued,
                        &mut ready,
                    );
                }
                Ok(Prediction::Skipped { reason }) => {
                    debug!(score_id = %id, reason = %reason, "predictor declined");
                    record(
                        &mut outcomes,
                        &mut remaining,
                        id.clone(),
                        ScoreOutcome::Skipped {
                            reason: SkipReason::PredictorDeclined { detail: reason },
                        },
                    );
                    enqueue_ready_dependents(
                        graph,
                        &id,
                        &outcomes,
                        &remaining,
                        &mut enqueued,
                        &mut ready,
                    );
                }
                Ok(Prediction::Paused { token }) => {
                    // Propagate immediately. In-flight siblings are
                    // abandoned; their outcomes are simply absent.
                    debug!(score_id = %id, token = %token, "prediction paused, unwinding run");
                    record(
                        &mut outcomes,
                        &mut remaining,
                        id.clone(),
                        ScoreOutcome::Paused {
                            token: token.clone(),
                        },
                    );
                    in_flight.abort_all();
                    return Err(RunError::Suspended {
                        score_id: id,
                        token,
                        outcomes,
                    });
                }
                Err(error) => match self.options.error_policy {
                    ErrorPolicy::ContinueDegraded => {
                        warn!(score_id = %id, error = %error, "prediction failed, degrading score");
                        record(
                            &mut outcomes,
                            &mut remaining,
                            id.clone(),
                            ScoreOutcome::errored(CODE_EXECUTION_FAILED, error.to_string()),
                        );
                        enqueue_ready_dependents(
                            graph,
                            &id,
                            &outcomes,
                            &remaining,
                            &mut enqueued,
                            &mut ready,
                        );
                    }
                    ErrorPolicy::FailFast => {
                        let message = error.to_string();
                        record(
                            &mut outcomes,
                            &mut remaining,
                            id.clone(),
                            ScoreOutcome::errored(CODE_EXECUTION_FAILED, message.clone()),
                        );
                        in_flight.abort_all();
                        return Err(RunError::ScoreFailed {
                            score_id: id,
                            message,
                            outcomes,
                        });
                    }
                },
            }
        }

        Ok(outcomes)
    }
}

/// Store a terminal outcome. Entries are monotonic for the duration of a
/// run: an existing entry is never overwritten.
fn record(
    outcomes: &mut HashMap<String, ScoreOutcome>,
    remaining: &mut HashSet<String>,
    id: String,
    outcome: ScoreOutcome,
) {
    remaining.remove(&id);
    match outcomes.entry(id) {
        Entry::Vacant(slot) => {
            slot.insert(outcome);
        }
        Entry::Occupied(existing) => {
            warn!(score_id = %existing.key(), "refusing to overwrite terminal outcome");
        }
    }
}

/// Enqueue every direct dependent of `terminal_id` whose dependencies all
/// have an entry now - whether those entries are real results or skip
/// sentinels. The `enqueued` guard makes each enqueue exactly-once.
fn enqueue_ready_dependents(
    graph: &ScoreGraph,
    terminal_id: &str,
    outcomes: &HashMap<String, ScoreOutcome>,
    remaining: &HashSet<String>,
    enqueued: &mut HashSet<String>,
    ready: &mut VecDeque<String>,
) {
    for dependent in graph.dependents(terminal_id) {
        if !remaining.contains(dependent) || enqueued.contains(dependent) {
            continue;
        }
        let Some(node) = graph.node(dependent) else {
            continue;
        };
        if node.deps.iter().all(|dep| outcomes.contains_key(dep)) {
            enqueued.insert(dependent.to_string());
            ready.push_back(dependent.to_string());
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "prediction panicked".to_string()
    }
}
