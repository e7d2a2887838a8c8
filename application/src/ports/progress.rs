//! Progress notification port
//!
//! Defines the interface for reporting progress while a probe run executes.
//! Notifications are fire-and-forget: nothing a notifier does can change
//! the course of a run.

use ctxprobe_domain::{Classification, Model, ProbeOutcome, StopCondition, StrategyKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Callback for progress updates during a probe run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bar, plain log lines, event stream).
pub trait ProbeProgressNotifier: Send + Sync {
    /// Called once before the first probe
    fn on_run_start(&self, model: &Model, strategy: StrategyKind, max_attempts: usize);

    /// Called before each probe is sent
    fn on_probe_start(&self, _model: &Model, _attempt_index: usize, _tokens: u64) {}

    /// Called when a transient failure is about to be retried
    fn on_retry(
        &self,
        _model: &Model,
        _attempt_index: usize,
        _classification: Classification,
        _delay: Duration,
    ) {
    }

    /// Called after every probe with the best accepted size so far
    fn on_probe_complete(
        &self,
        model: &Model,
        outcome: &ProbeOutcome,
        running_estimate: Option<u64>,
    );

    /// Called once when the run halts
    fn on_run_complete(&self, model: &Model, stop: StopCondition);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProbeProgressNotifier for NoProgress {
    fn on_run_start(&self, _model: &Model, _strategy: StrategyKind, _max_attempts: usize) {}
    fn on_probe_complete(&self, _model: &Model, _outcome: &ProbeOutcome, _estimate: Option<u64>) {}
    fn on_run_complete(&self, _model: &Model, _stop: StopCondition) {}
}

/// Progress events forwarded by [`ChannelProgressNotifier`]
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    RunStarted {
        model: Model,
        strategy: StrategyKind,
        max_attempts: usize,
    },
    ProbeStarted {
        model: Model,
        attempt_index: usize,
        tokens: u64,
    },
    Retrying {
        model: Model,
        attempt_index: usize,
        classification: Classification,
        delay: Duration,
    },
    ProbeCompleted {
        model: Model,
        outcome: ProbeOutcome,
        running_estimate: Option<u64>,
    },
    RunFinished {
        model: Model,
        stop: StopCondition,
    },
}

/// Forwards every notification into an unbounded channel.
///
/// A dropped receiver is ignored.
pub struct ChannelProgressNotifier {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressNotifier {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// Create a notifier together with its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

impl ProbeProgressNotifier for ChannelProgressNotifier {
    fn on_run_start(&self, model: &Model, strategy: StrategyKind, max_attempts: usize) {
        self.send(ProgressEvent::RunStarted {
            model: model.clone(),
            strategy,
            max_attempts,
        });
    }

    fn on_probe_start(&self, model: &Model, attempt_index: usize, tokens: u64) {
        self.send(ProgressEvent::ProbeStarted {
            model: model.clone(),
            attempt_index,
            tokens,
        });
    }

    fn on_retry(
        &self,
        model: &Model,
        attempt_index: usize,
        classification: Classification,
        delay: Duration,
    ) {
        self.send(ProgressEvent::Retrying {
            model: model.clone(),
            attempt_index,
            classification,
            delay,
        });
    }

    fn on_probe_complete(
        &self,
        model: &Model,
        outcome: &ProbeOutcome,
        running_estimate: Option<u64>,
    ) {
        self.send(ProgressEvent::ProbeCompleted {
            model: model.clone(),
            outcome: outcome.clone(),
            running_estimate,
        });
    }

    fn on_run_complete(&self, model: &Model, stop: StopCondition) {
        self.send(ProgressEvent::RunFinished {
            model: model.clone(),
            stop,
        });
    }
}
