//! A fixed-interval background task with explicit start and stop.
//!
//! The action runs inline in the tick loop, so two invocations never overlap
//! and a slow action delays the following tick instead of piling up.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};

type Action = Box<dyn FnMut() -> BoxFuture<'static, Result<()>> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    Stopped,
}

pub struct PeriodicTask {
    name: &'static str,
    interval: Duration,
    run_on_startup: bool,
    state: TaskState,
    action: Option<Action>,
    shutdown_tx: Option<watch::Sender<bool>>,
    join: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn new<F, Fut>(name: &'static str, interval: Duration, mut action: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name,
            interval,
            run_on_startup: false,
            state: TaskState::Idle,
            action: Some(Box::new(move || action().boxed())),
            shutdown_tx: None,
            join: None,
        }
    }

    /// Fire once as soon as the task starts instead of waiting a full interval.
    pub fn run_on_startup(mut self, enabled: bool) -> Self {
        self.run_on_startup = enabled;
        self
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Spawns the tick loop on the current tokio runtime. Only an idle task
    /// can be started.
    pub fn start(&mut self) {
        if self.state != TaskState::Idle {
            warn!(task = self.name, state = ?self.state, "periodic task already started");
            return;
        }
        let Some(action) = self.action.take() else {
            return;
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.join = Some(tokio::spawn(tick_loop(
            self.name,
            self.interval,
            self.run_on_startup,
            action,
            shutdown_rx,
        )));
        self.shutdown_tx = Some(shutdown_tx);
        self.state = TaskState::Running;

        info!(
            task = self.name,
            interval_secs = self.interval.as_secs_f64(),
            run_on_startup = self.run_on_startup,
            "periodic task started"
        );
    }

    /// Signals the loop to exit and waits for it, including any action that
    /// is currently running. No action runs after this returns.
    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            // the loop may already be gone
            let _ = shutdown_tx.send(true);
        }
        if let Some(join) = self.join.take() {
            if let Err(err) = join.await {
                error!(task = self.name, error = %err, "periodic task ended abnormally");
            }
        }
        self.action = None;
        self.state = TaskState::Stopped;
    }
}

async fn tick_loop(
    name: &'static str,
    interval: Duration,
    run_on_startup: bool,
    mut action: Action,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let first = if run_on_startup {
        Instant::now()
    } else {
        Instant::now() + interval
    };
    let mut ticker = tokio::time::interval_at(first, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        match AssertUnwindSafe(action()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(task = name, error = ?err, "periodic task failed"),
            Err(_) => error!(task = name, "periodic task panicked"),
        }
    }

    info!(task = name, "periodic task stopped");
}
