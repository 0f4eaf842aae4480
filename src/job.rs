//! Generic job lifecycle shared by every tool.
//!
//! `Idle → Validating → Running(progress) → Preparing(countdown) → Ready(output)`,
//! with `Cancelled` and `Failed` reachable from the in-flight states. A job runs as a
//! tokio task and reports through a channel the hub drains on every command. Each
//! task is bound to a [`JobTicket`]; dropping the ticket cancels the task.

use crate::artifact::{Artifact, ArtifactHandle, ArtifactStore};
use crate::error::HubError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

pub type JobId = u64;

/// One entry of a list-shaped result (generated shorts, fetched tracks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionItem {
    pub title: String,
    pub detail: String,
    pub thumbnail_url: String,
    pub download_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub title: String,
    pub subtitle: Option<String>,
    pub bundle_name: Option<String>,
    pub items: Vec<CollectionItem>,
}

/// What a finished task hands back before the hub registers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deliverable {
    Artifact(Artifact),
    Text(String),
    Collection(Collection),
}

/// Output held by a `Ready` job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutput {
    Download(ArtifactHandle),
    Text(String),
    Collection(Collection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Validating,
    Running { progress: u8 },
    Preparing { remaining_secs: u32 },
    Ready(JobOutput),
    Cancelled,
    Failed(HubError),
}

impl JobStatus {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            JobStatus::Validating | JobStatus::Running { .. } | JobStatus::Preparing { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Validating => "validating",
            JobStatus::Running { .. } => "running",
            JobStatus::Preparing { .. } => "preparing",
            JobStatus::Ready(_) => "ready",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStep {
    Fixed(u8),
    /// Inclusive bounds.
    Random { min: u8, max: u8 },
}

/// Timer-driven stand-in for real work.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedWork {
    /// `None` runs silently until the deadline.
    pub tick: Option<Duration>,
    pub step: ProgressStep,
    pub ceiling: u8,
    pub duration: Duration,
    pub countdown_secs: u32,
    pub seed: Option<u64>,
}

impl SimulatedWork {
    pub const fn converter(tick_ms: u64, duration_ms: u64, countdown_secs: u32) -> Self {
        Self {
            tick: Some(Duration::from_millis(tick_ms)),
            step: ProgressStep::Random { min: 5, max: 14 },
            ceiling: 95,
            duration: Duration::from_millis(duration_ms),
            countdown_secs,
            seed: None,
        }
    }

    pub const fn immediate() -> Self {
        Self {
            tick: None,
            step: ProgressStep::Fixed(0),
            ceiling: 100,
            duration: Duration::ZERO,
            countdown_secs: 0,
            seed: None,
        }
    }

    pub const fn with_step(mut self, step: ProgressStep) -> Self {
        self.step = step;
        self
    }

    pub const fn with_ceiling(mut self, ceiling: u8) -> Self {
        self.ceiling = ceiling;
        self
    }

    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn advance(&self, progress: u8, rng: &mut StdRng) -> u8 {
        let step = match self.step {
            ProgressStep::Fixed(step) => step,
            ProgressStep::Random { min, max } if min < max => rng.gen_range(min..=max),
            ProgressStep::Random { min, .. } => min,
        };
        progress.saturating_add(step).min(self.ceiling.min(100))
    }
}

pub type RemoteCall = Pin<Box<dyn Future<Output = Result<String, HubError>> + Send>>;

pub enum Work {
    Simulated(SimulatedWork),
    /// Single suspend point with no progress signal.
    Remote(RemoteCall),
}

pub enum WorkOutcome {
    Simulated,
    Remote(String),
}

pub type Finisher = Box<dyn FnOnce(WorkOutcome) -> Result<Deliverable, HubError> + Send>;

pub struct JobSpec {
    pub work: Work,
    pub finish: Finisher,
}

impl JobSpec {
    pub fn simulated<F>(work: SimulatedWork, finish: F) -> Self
    where
        F: FnOnce() -> Result<Deliverable, HubError> + Send + 'static,
    {
        Self {
            work: Work::Simulated(work),
            finish: Box::new(move |_| finish()),
        }
    }

    pub fn remote<F>(call: RemoteCall, finish: F) -> Self
    where
        F: FnOnce(String) -> Result<Deliverable, HubError> + Send + 'static,
    {
        Self {
            work: Work::Remote(call),
            finish: Box::new(move |outcome| match outcome {
                WorkOutcome::Remote(text) => finish(text),
                WorkOutcome::Simulated => Err(HubError::resource("remote_outcome_missing")),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobUpdate {
    Progress(u8),
    Preparing(u32),
    Finished(Result<Deliverable, HubError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: JobId,
    pub update: JobUpdate,
}

/// Scoped ownership of a running task. Dropping it cancels the task.
pub struct JobTicket {
    id: JobId,
    _guard: DropGuard,
}

impl JobTicket {
    pub fn id(&self) -> JobId {
        self.id
    }
}

/// Spawns job tasks and collects their events.
pub struct JobRunner {
    runtime: Handle,
    tx: mpsc::UnboundedSender<JobEvent>,
    rx: mpsc::UnboundedReceiver<JobEvent>,
    next_id: JobId,
}

impl JobRunner {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            tx,
            rx,
            next_id: 1,
        }
    }

    pub fn launch(&mut self, spec: JobSpec) -> JobTicket {
        let id = self.next_id;
        self.next_id += 1;
        let token = CancellationToken::new();
        let task_token = token.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(run_job(id, spec, task_token, tx));
        log::debug!("job {id} launched");
        JobTicket {
            id,
            _guard: token.drop_guard(),
        }
    }

    pub fn drain(&mut self) -> Vec<JobEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Drop queued events of one job, keeping the others in order.
    pub fn discard(&mut self, job_id: JobId) -> usize {
        let events = self.drain();
        let before = events.len();
        let kept: Vec<JobEvent> = events.into_iter().filter(|e| e.job_id != job_id).collect();
        let dropped = before - kept.len();
        for event in kept {
            let _ = self.tx.send(event);
        }
        dropped
    }
}

async fn run_job(
    id: JobId,
    spec: JobSpec,
    token: CancellationToken,
    tx: mpsc::UnboundedSender<JobEvent>,
) {
    let emit = |update: JobUpdate| {
        let _ = tx.send(JobEvent { job_id: id, update });
    };

    let outcome = match spec.work {
        Work::Simulated(work) => {
            if !run_simulated(&work, &token, &emit).await {
                log::debug!("job {id} cancelled");
                return;
            }
            WorkOutcome::Simulated
        }
        Work::Remote(call) => {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::debug!("job {id} cancelled while awaiting the service");
                    return;
                }
                result = call => result,
            };
            match result {
                Ok(text) => WorkOutcome::Remote(text),
                Err(err) => {
                    log::warn!("job {id} failed: {err}");
                    emit(JobUpdate::Finished(Err(err)));
                    return;
                }
            }
        }
    };

    if token.is_cancelled() {
        return;
    }
    // Finishers decode and encode files; they run on the blocking pool.
    let finish = spec.finish;
    let blocking = tokio::task::spawn_blocking(move || finish(outcome));
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => {
            log::debug!("job {id} cancelled while finishing");
            return;
        }
        joined = blocking => match joined {
            Ok(result) => result,
            Err(err) => {
                log::warn!("job {id} finisher did not complete: {err}");
                Err(HubError::resource("Something went wrong while preparing your file."))
            }
        },
    };
    if token.is_cancelled() {
        return;
    }
    emit(JobUpdate::Finished(result));
}

/// Returns `false` when cancelled. Nothing is emitted after cancellation.
async fn run_simulated<F>(work: &SimulatedWork, token: &CancellationToken, emit: &F) -> bool
where
    F: Fn(JobUpdate),
{
    let mut rng = match work.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let start = Instant::now();
    let deadline = start + work.duration;
    let mut ticker = work.tick.filter(|t| !t.is_zero()).map(|period| {
        let mut interval = interval_at(start + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let mut progress = 0u8;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return false,
            _ = sleep_until(deadline) => break,
            _ = next_tick(&mut ticker) => {
                let next = work.advance(progress, &mut rng);
                if next != progress {
                    progress = next;
                    emit(JobUpdate::Progress(progress));
                }
            }
        }
    }
    emit(JobUpdate::Progress(100));

    let mut remaining = work.countdown_secs;
    loop {
        emit(JobUpdate::Preparing(remaining));
        if remaining == 0 {
            break;
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => return false,
            _ = sleep(Duration::from_secs(1)) => {}
        }
        if token.is_cancelled() {
            return false;
        }
        remaining -= 1;
    }
    !token.is_cancelled()
}

async fn next_tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Job state owned by one mounted handler.
pub struct JobSlot {
    status: JobStatus,
    ticket: Option<JobTicket>,
}

impl Default for JobSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl JobSlot {
    pub const fn new() -> Self {
        Self {
            status: JobStatus::Idle,
            ticket: None,
        }
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.ticket.as_ref().map(JobTicket::id)
    }

    pub fn output(&self) -> Option<&JobOutput> {
        match &self.status {
            JobStatus::Ready(output) => Some(output),
            _ => None,
        }
    }

    pub fn progress(&self) -> u8 {
        match self.status {
            JobStatus::Running { progress } => progress,
            JobStatus::Preparing { .. } | JobStatus::Ready(_) => 100,
            _ => 0,
        }
    }

    /// Enter `Validating`. Refused while a job is in flight or holds output.
    pub fn begin(&mut self) -> bool {
        if self.status.is_busy() || matches!(self.status, JobStatus::Ready(_)) {
            return false;
        }
        self.ticket = None;
        self.status = JobStatus::Validating;
        true
    }

    pub fn fail(&mut self, error: HubError) {
        self.ticket = None;
        self.status = JobStatus::Failed(error);
    }

    pub fn attach(&mut self, ticket: JobTicket) {
        self.ticket = Some(ticket);
        self.status = JobStatus::Running { progress: 0 };
    }

    /// Apply one event from the runner. Events from other jobs are ignored.
    /// Returns the deliverable when the job just finished successfully.
    pub fn apply(&mut self, event: JobEvent) -> Option<Deliverable> {
        if self.job_id() != Some(event.job_id) {
            return None;
        }
        match event.update {
            JobUpdate::Progress(value) => {
                if let JobStatus::Running { progress } = &mut self.status {
                    *progress = (*progress).max(value.min(100));
                }
                None
            }
            JobUpdate::Preparing(remaining_secs) => {
                match self.status {
                    JobStatus::Running { progress: 100 } | JobStatus::Preparing { .. } => {
                        self.status = JobStatus::Preparing { remaining_secs };
                    }
                    _ => {}
                }
                None
            }
            JobUpdate::Finished(Ok(deliverable)) => {
                if self.status.is_busy() {
                    Some(deliverable)
                } else {
                    None
                }
            }
            JobUpdate::Finished(Err(error)) => {
                if self.status.is_busy() {
                    self.fail(error);
                }
                None
            }
        }
    }

    pub fn complete(&mut self, output: JobOutput) {
        self.ticket = None;
        self.status = JobStatus::Ready(output);
    }

    /// Stop the task. Returns the id of the job that was stopped, if any.
    pub fn cancel(&mut self) -> Option<JobId> {
        if !self.status.is_busy() {
            return None;
        }
        let id = self.job_id();
        self.ticket = None;
        self.status = JobStatus::Cancelled;
        id
    }

    /// Back to `Idle`, revoking any artifact the job produced.
    pub fn clear(&mut self, artifacts: &mut ArtifactStore) -> Option<JobId> {
        let id = self.job_id();
        self.ticket = None;
        if let JobStatus::Ready(JobOutput::Download(handle)) = &self.status {
            artifacts.revoke(*handle);
        }
        self.status = JobStatus::Idle;
        id
    }
}

/// Register a deliverable and move the slot to `Ready`.
pub fn settle(slot: &mut JobSlot, deliverable: Deliverable, artifacts: &mut ArtifactStore) {
    let output = match deliverable {
        Deliverable::Artifact(artifact) => JobOutput::Download(artifacts.insert(artifact)),
        Deliverable::Text(text) => JobOutput::Text(text),
        Deliverable::Collection(collection) => JobOutput::Collection(collection),
    };
    slot.complete(output);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_spec(work: SimulatedWork) -> JobSpec {
        JobSpec::simulated(work, || Ok(Deliverable::Text("done".into())))
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_progress_is_monotonic_and_ends_at_100() {
        let mut runner = JobRunner::new(Handle::current());
        let work = SimulatedWork::converter(250, 3000, 5).with_seed(7);
        let ticket = runner.launch(text_spec(work));

        sleep(Duration::from_secs(10)).await;
        let events = runner.drain();

        let mut last = 0u8;
        let mut saw_hundred = false;
        let mut countdown = Vec::new();
        let mut finished = false;
        for event in &events {
            assert_eq!(event.job_id, ticket.id());
            match &event.update {
                JobUpdate::Progress(p) => {
                    assert!(!saw_hundred, "progress after reaching 100");
                    assert!(*p >= last, "progress went backwards: {last} -> {p}");
                    last = *p;
                    saw_hundred = *p == 100;
                }
                JobUpdate::Preparing(r) => {
                    assert!(saw_hundred, "preparing before progress hit 100");
                    countdown.push(*r);
                }
                JobUpdate::Finished(result) => {
                    assert_eq!(result, &Ok(Deliverable::Text("done".into())));
                    finished = true;
                }
            }
        }
        assert!(saw_hundred);
        assert_eq!(countdown, vec![5, 4, 3, 2, 1, 0]);
        assert!(finished);
        assert!(matches!(events.last().map(|e| &e.update), Some(JobUpdate::Finished(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_holds_until_deadline() {
        let mut runner = JobRunner::new(Handle::current());
        let work = SimulatedWork::converter(200, 2500, 0)
            .with_step(ProgressStep::Fixed(10))
            .with_ceiling(95);
        let _ticket = runner.launch(text_spec(work));

        sleep(Duration::from_millis(2300)).await;
        let progress: Vec<u8> = runner
            .drain()
            .into_iter()
            .filter_map(|e| match e.update {
                JobUpdate::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(progress.last(), Some(&95));
        assert!(!progress.contains(&100));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_ticket_stops_all_events() {
        let mut runner = JobRunner::new(Handle::current());
        let ticket = runner.launch(text_spec(SimulatedWork::converter(250, 3000, 5)));

        sleep(Duration::from_millis(600)).await;
        let id = ticket.id();
        drop(ticket);
        runner.discard(id);

        sleep(Duration::from_secs(30)).await;
        assert!(runner.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_countdown_stops_events() {
        let mut runner = JobRunner::new(Handle::current());
        let mut slot = JobSlot::new();
        assert!(slot.begin());
        slot.attach(runner.launch(text_spec(SimulatedWork::converter(250, 1000, 5))));

        sleep(Duration::from_millis(2500)).await;
        for event in runner.drain() {
            slot.apply(event);
        }
        assert!(matches!(slot.status(), JobStatus::Preparing { .. }));

        let id = slot.cancel().expect("job was running");
        runner.discard(id);
        assert_eq!(slot.status(), &JobStatus::Cancelled);

        sleep(Duration::from_secs(30)).await;
        assert!(runner.drain().is_empty());
        assert_eq!(slot.status(), &JobStatus::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn remote_failure_is_reported() {
        let mut runner = JobRunner::new(Handle::current());
        let call: RemoteCall = Box::pin(async {
            Err(HubError::from(crate::error::ServiceError::Unconfigured))
        });
        let spec = JobSpec::remote(call, |text| Ok(Deliverable::Text(text)));
        let mut slot = JobSlot::new();
        slot.begin();
        slot.attach(runner.launch(spec));

        sleep(Duration::from_millis(10)).await;
        for event in runner.drain() {
            assert!(slot.apply(event).is_none());
        }
        assert_eq!(
            slot.status(),
            &JobStatus::Failed(HubError::Service(crate::error::ServiceError::Unconfigured))
        );
    }

    #[tokio::test]
    async fn cancel_while_finishing_returns_without_waiting() {
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let spec = JobSpec::simulated(SimulatedWork::immediate(), move || {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
            Ok(Deliverable::Text("late".into()))
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let task = tokio::spawn(run_job(9, spec, token.clone(), tx));

        started_rx.await.expect("finisher started");
        token.cancel();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("job returned while the finisher was still busy")
            .expect("job task");

        release_tx.send(()).expect("finisher waiting");
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event.update, JobUpdate::Finished(_)), "{event:?}");
        }
    }

    #[test]
    fn slot_refuses_start_while_ready() {
        let mut artifacts = ArtifactStore::new();
        let mut slot = JobSlot::new();
        assert!(slot.begin());
        settle(
            &mut slot,
            Deliverable::Artifact(Artifact::new(vec![1], "text/plain", "a.txt")),
            &mut artifacts,
        );
        assert!(!slot.begin());
        assert_eq!(artifacts.len(), 1);

        slot.clear(&mut artifacts);
        assert!(artifacts.is_empty());
        assert_eq!(slot.status(), &JobStatus::Idle);
        assert!(slot.begin());
    }

    #[test]
    fn events_for_other_jobs_are_ignored() {
        let mut slot = JobSlot::new();
        let stale = JobEvent {
            job_id: 42,
            update: JobUpdate::Finished(Ok(Deliverable::Text("stale".into()))),
        };
        assert!(slot.apply(stale).is_none());
        assert_eq!(slot.status(), &JobStatus::Idle);
    }
}
