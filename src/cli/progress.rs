//! Console spinner shown while a build is prepared and downloaded
//!
//! A background task redraws a one-line indicatif spinner every
//! [`UPDATE_FREQUENCY_MS`] with the current [`BuildProgress`] as `N%`.
//! The spinner moves through `Idle -> Running -> Stopped`; it starts at most
//! once and stopping is idempotent. Dropping a running [`Spinner`] stops it,
//! so an early return on error never leaves the animation running.
//!
//! # Examples
//!
//! ```rust,no_run
//! use crowdin_export::app::BuildProgress;
//! use crowdin_export::cli::{Spinner, SpinnerConfig};
//!
//! # async fn example() {
//! let progress = BuildProgress::new();
//! let mut spinner = Spinner::new(SpinnerConfig::default());
//! spinner.start(progress.clone());
//!
//! progress.set(40);
//! // ... long running work ...
//!
//! spinner.stop().await;
//! # }
//! ```
//!
//! [`UPDATE_FREQUENCY_MS`]: crate::constants::progress::UPDATE_FREQUENCY_MS

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::BuildProgress;
use crate::constants::progress::{SPINNER_FRAMES, UPDATE_FREQUENCY_MS};

/// Where the spinner is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerTarget {
    /// Standard output (hidden automatically when it is not a terminal)
    Stdout,
    /// Nothing is drawn; state is still tracked
    Hidden,
}

/// Configuration for the spinner
#[derive(Debug, Clone)]
pub struct SpinnerConfig {
    /// Disabled spinners never start
    pub enabled: bool,
    /// How often the display is refreshed
    pub update_interval: Duration,
    pub target: SpinnerTarget,
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            update_interval: Duration::from_millis(UPDATE_FREQUENCY_MS),
            target: SpinnerTarget::Stdout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerState {
    Idle,
    Running,
    Stopped,
}

pub struct Spinner {
    config: SpinnerConfig,
    state: SpinnerState,
    bar: Option<ProgressBar>,
    stop_tx: Option<oneshot::Sender<()>>,
    update_task: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn new(config: SpinnerConfig) -> Self {
        Self {
            config,
            state: SpinnerState::Idle,
            bar: None,
            stop_tx: None,
            update_task: None,
        }
    }

    /// A spinner that never draws anything (`--nospin`)
    pub fn disabled() -> Self {
        Self::new(SpinnerConfig {
            enabled: false,
            ..Default::default()
        })
    }

    pub fn state(&self) -> SpinnerState {
        self.state
    }

    /// Last message drawn, e.g. `"40%"`
    pub fn message(&self) -> Option<String> {
        self.bar.as_ref().map(|bar| bar.message())
    }

    /// Start animating, sampling `progress` on every refresh
    ///
    /// Returns `true` only for the call that actually started the spinner.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, progress: BuildProgress) -> bool {
        if !self.config.enabled || self.state != SpinnerState::Idle {
            return false;
        }

        let bar = ProgressBar::with_draw_target(None, self.draw_target());
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(SPINNER_FRAMES),
        );
        bar.set_message(format!("{}%", progress.percent()));

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let task_bar = bar.clone();
        let update_interval = self.config.update_interval;
        let update_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(update_interval);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        task_bar.set_message(format!("{}%", progress.percent()));
                        task_bar.tick();
                    }
                }
            }
            task_bar.finish_and_clear();
        });

        self.bar = Some(bar);
        self.stop_tx = Some(stop_tx);
        self.update_task = Some(update_task);
        self.state = SpinnerState::Running;
        debug!("Spinner started");
        true
    }

    /// Stop the spinner and wait for the display task to exit
    pub async fn stop(&mut self) {
        self.signal_stop();
        if let Some(task) = self.update_task.take() {
            let _ = task.await;
        }
    }

    fn signal_stop(&mut self) {
        if self.state != SpinnerState::Running {
            return;
        }
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        self.state = SpinnerState::Stopped;
        debug!("Spinner stopped");
    }

    fn draw_target(&self) -> ProgressDrawTarget {
        match self.config.target {
            SpinnerTarget::Stdout => ProgressDrawTarget::stdout(),
            SpinnerTarget::Hidden => ProgressDrawTarget::hidden(),
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
