use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::model::RawRecord;
use crate::parsers::{ParseContext, RecordParser};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one orchestrated run, as seen by the supervisor.
///
/// The caller collects outputs from the queue during every state from
/// `Dispatching` on. `Draining` starts once the last task has finished: no
/// output can be added any more and the caller only empties what is still
/// buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing started yet
    Idle,
    /// Parse tasks are being spawned
    Dispatching,
    /// Every task is spawned; waiting for all of them to finish
    AwaitingCompletion,
    /// All tasks finished and the result queue is closed; buffered outputs
    /// are being collected
    Draining,
    /// Results handed back to the caller
    Closed,
}

/// How the supervisor's wait ended
#[derive(Debug)]
enum Completion {
    Finished { failed: usize },
    Cancelled,
    TimedOut(Duration),
}

/// Fans records out to parse tasks and gathers their outputs.
///
/// One task per record, at most `max_concurrency` at a time. Outputs flow
/// through a bounded queue that is closed by a supervisor task once every
/// record task has finished, whatever its outcome.
pub struct Orchestrator {
    max_concurrency: usize,
    queue_capacity: usize,
    deadline: Option<Duration>,
    cancel: CancellationToken,
    state: Arc<Mutex<PipelineState>>,
}

impl Orchestrator {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            queue_capacity: config.queue_capacity.max(1),
            deadline: config.deadline_secs.map(Duration::from_secs),
            cancel: CancellationToken::new(),
            state: Arc::new(Mutex::new(PipelineState::Idle)),
        }
    }

    /// Give up on the run once `deadline` has elapsed
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Use an externally owned token to cancel the run
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse every record and return the successful outputs in completion
    /// order. Records that fail to parse are logged and left out.
    pub async fn run<P: RecordParser>(
        &self,
        parser: Arc<P>,
        records: Vec<RawRecord>,
        context: ParseContext,
    ) -> Result<Vec<P::Output>, IngestError> {
        let total = records.len();
        info!("Parsing {} records with the {} parser", total, parser.name());

        let (sender, mut receiver) = mpsc::channel(self.queue_capacity);
        let supervisor = tokio::spawn(supervise(
            parser,
            records,
            context,
            sender,
            self.max_concurrency,
            self.deadline,
            self.cancel.clone(),
            Arc::clone(&self.state),
        ));

        let mut outputs = Vec::with_capacity(total);
        while let Some(output) = receiver.recv().await {
            outputs.push(output);
        }

        let completion = supervisor.await?;
        set_state(&self.state, PipelineState::Closed);

        match completion {
            Completion::Finished { failed } => {
                info!(
                    "Parsed {} of {} records ({} failed)",
                    outputs.len(),
                    total,
                    failed
                );
                Ok(outputs)
            }
            Completion::Cancelled => {
                warn!("Run cancelled after {} of {} records", outputs.len(), total);
                Err(IngestError::Cancelled)
            }
            Completion::TimedOut(deadline) => {
                warn!(
                    "Run exceeded its {:?} deadline after {} of {} records",
                    deadline,
                    outputs.len(),
                    total
                );
                Err(IngestError::DeadlineExceeded(deadline))
            }
        }
    }
}

fn set_state(state: &Mutex<PipelineState>, next: PipelineState) {
    let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
    debug!("Pipeline state {:?} -> {:?}", *current, next);
    *current = next;
}

/// Spawns the record tasks, waits for all of them and closes the queue by
/// dropping the last sender on return.
#[allow(clippy::too_many_arguments)]
async fn supervise<P: RecordParser>(
    parser: Arc<P>,
    records: Vec<RawRecord>,
    context: ParseContext,
    sender: mpsc::Sender<P::Output>,
    max_concurrency: usize,
    deadline: Option<Duration>,
    cancel: CancellationToken,
    state: Arc<Mutex<PipelineState>>,
) -> Completion {
    let mut tasks = JoinSet::new();

    let completion = {
        let dispatch_and_wait = dispatch_and_wait(
            &mut tasks,
            parser,
            records,
            context,
            &sender,
            max_concurrency,
            &cancel,
            &state,
        );
        let expired = async {
            match deadline {
                Some(deadline) => {
                    tokio::time::sleep(deadline).await;
                    deadline
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Completion::Cancelled,
            deadline = expired => Completion::TimedOut(deadline),
            failed = dispatch_and_wait => Completion::Finished { failed },
        }
    };

    if !matches!(completion, Completion::Finished { .. }) {
        cancel.cancel();
        // Force the barrier down so no task outlives the run
        tasks.shutdown().await;
    }

    set_state(&state, PipelineState::Draining);
    drop(sender);
    completion
}

#[allow(clippy::too_many_arguments)]
async fn dispatch_and_wait<P: RecordParser>(
    tasks: &mut JoinSet<bool>,
    parser: Arc<P>,
    records: Vec<RawRecord>,
    context: ParseContext,
    sender: &mpsc::Sender<P::Output>,
    max_concurrency: usize,
    cancel: &CancellationToken,
    state: &Mutex<PipelineState>,
) -> usize {
    set_state(state, PipelineState::Dispatching);
    let permits = Arc::new(Semaphore::new(max_concurrency));

    for (index, record) in records.into_iter().enumerate() {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let parser = Arc::clone(&parser);
        let context = context.clone();
        let sender = sender.clone();
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let _permit = permit;
            parse_record(parser, index, record, context, sender, &cancel).await
        });
    }

    set_state(state, PipelineState::AwaitingCompletion);
    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(true) => {}
            Ok(false) => failed += 1,
            Err(e) => {
                error!("Parse task died: {}", e);
                failed += 1;
            }
        }
    }
    failed
}

/// Parse one record and emit the output. Returns whether an output was emitted.
///
/// Parsing is CPU-bound and locks the catalog, so it runs on the blocking
/// pool. An aborted task stops waiting for it; the parse itself finishes in
/// the background and its output is discarded.
async fn parse_record<P: RecordParser>(
    parser: Arc<P>,
    index: usize,
    record: RawRecord,
    context: ParseContext,
    sender: mpsc::Sender<P::Output>,
    cancel: &CancellationToken,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }

    let parsed = tokio::task::spawn_blocking(move || parser.parse(record, &context)).await;
    match parsed {
        Ok(Ok(output)) => tokio::select! {
            sent = sender.send(output) => sent.is_ok(),
            _ = cancel.cancelled() => false,
        },
        Ok(Err(e)) => {
            warn!("Dropping record {}: {}", index, e);
            false
        }
        Err(e) => {
            error!("Parse of record {} panicked: {}", index, e);
            false
        }
    }
}
