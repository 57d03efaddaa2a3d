//! The control-plane sampler.
//!
//! Every tick the sampler reads the frequency and amplitude channels, maps the
//! raw codes through a [`ControlMapping`], advances the [`ParameterSmoother`]
//! and publishes the result. A tick whose read fails, or returns a code above
//! full scale, publishes nothing: the render path keeps the last snapshot and
//! the next tick retries.
//!
//! [`Sampler::spawn`] moves the sampler onto a dedicated thread driven by a
//! fixed-rate [`crossbeam_channel::tick`] timer. Stopping is signalled over a
//! channel, so the loop exits within one poll interval (or one blocked read).

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, select};
use pitchpot_core::{
    ControlMapping, ControlTarget, ParameterPublisher, ParameterSmoother, SmoothedParameters,
};

use crate::input::{ChannelId, ControlError, ControlInput};

/// How the smoothing coefficient tracks tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingInterval {
    /// α is derived once from the configured poll rate.
    #[default]
    Nominal,
    /// α is recomputed from the measured time since the previous tick.
    Measured,
}

/// Static sampler configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    /// Ticks per second.
    pub poll_hz: f32,
    /// Channel carrying the frequency knob.
    pub frequency_channel: ChannelId,
    /// Channel carrying the amplitude knob.
    pub amplitude_channel: ChannelId,
    /// Code-to-unit mapping for both knobs.
    pub mapping: ControlMapping,
    /// Smoothing time constant in seconds.
    pub smoothing_tau_s: f32,
    /// Coefficient update policy.
    pub interval: SmoothingInterval,
}

impl SamplerSettings {
    /// Nominal time between ticks.
    ///
    /// Rates that give no representable interval fall back to one second.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.poll_hz)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(1))
    }

    /// Consecutive failed ticks that add up to roughly one second.
    fn failure_warn_ticks(&self) -> u32 {
        (self.poll_hz.ceil() as u32).max(1)
    }
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            poll_hz: 100.0,
            frequency_channel: ChannelId::CH5,
            amplitude_channel: ChannelId::CH6,
            mapping: ControlMapping::default(),
            smoothing_tau_s: 0.02,
            interval: SmoothingInterval::Nominal,
        }
    }
}

/// Why a tick published nothing.
#[derive(Debug)]
pub enum SkipReason {
    /// The input failed to deliver a code.
    Read {
        /// Channel being read.
        channel: ChannelId,
        /// Input error.
        error: ControlError,
    },
    /// The input returned a code above full scale.
    OutOfRange {
        /// Channel being read.
        channel: ChannelId,
        /// Offending code.
        code: u16,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Read { channel, error } => write!(f, "{channel}: {error}"),
            SkipReason::OutOfRange { channel, code } => {
                write!(f, "{channel}: code {code} above full scale")
            }
        }
    }
}

impl SkipReason {
    /// True if a later tick may succeed without intervention.
    ///
    /// A garbled code is treated as a transfer glitch.
    pub fn is_transient(&self) -> bool {
        match self {
            SkipReason::Read { error, .. } => error.is_transient(),
            SkipReason::OutOfRange { .. } => true,
        }
    }
}

/// Result of one sampler tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// A new snapshot was published.
    Published(SmoothedParameters),
    /// Nothing was published; the previous snapshot stands.
    Skipped(SkipReason),
}

impl TickOutcome {
    /// True if this tick published.
    pub fn is_published(&self) -> bool {
        matches!(self, TickOutcome::Published(_))
    }
}

/// Tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerStats {
    /// Ticks run.
    pub ticks: u64,
    /// Ticks that published a snapshot.
    pub published: u64,
    /// Ticks skipped because of a failed or garbled read.
    pub skipped: u64,
    /// Skipped ticks whose input error is not expected to clear.
    pub persistent: u64,
}

/// Reads, maps, smooths and publishes control values.
///
/// Owns the control input, the write half of the parameter channel and the
/// working smoothed values. Nothing else mutates them.
pub struct Sampler {
    input: Box<dyn ControlInput>,
    publisher: ParameterPublisher,
    settings: SamplerSettings,
    smoother: ParameterSmoother,
    current: SmoothedParameters,
    stats: SamplerStats,
    failure_streak: u32,
    warned: bool,
}

impl Sampler {
    /// Creates a sampler starting from the publisher's current snapshot.
    pub fn new(
        input: Box<dyn ControlInput>,
        publisher: ParameterPublisher,
        settings: SamplerSettings,
    ) -> Self {
        let smoother = ParameterSmoother::from_poll_rate(settings.smoothing_tau_s, settings.poll_hz);
        let current = publisher.current();
        Self {
            input,
            publisher,
            settings,
            smoother,
            current,
            stats: SamplerStats::default(),
            failure_streak: 0,
            warned: false,
        }
    }

    /// Runs one tick with the nominal smoothing coefficient.
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;
        match self.read_target() {
            Ok(target) => {
                self.current = self.smoother.step(self.current, target);
                self.publisher.publish(self.current);
                self.stats.published += 1;
                self.record_success();
                TickOutcome::Published(self.current)
            }
            Err(reason) => {
                self.stats.skipped += 1;
                self.record_failure(&reason);
                TickOutcome::Skipped(reason)
            }
        }
    }

    /// Runs one tick after recomputing α for `elapsed` since the last tick.
    pub fn tick_after(&mut self, elapsed: Duration) -> TickOutcome {
        self.smoother.retime(elapsed.as_secs_f32());
        self.tick()
    }

    /// Working smoothed values (equal to the last publication).
    pub fn current(&self) -> SmoothedParameters {
        self.current
    }

    /// Counters so far.
    pub fn stats(&self) -> SamplerStats {
        self.stats
    }

    /// Settings in use.
    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    /// Smoother in use.
    pub fn smoother(&self) -> &ParameterSmoother {
        &self.smoother
    }

    /// Consumes the sampler and returns its input.
    pub fn into_input(self) -> Box<dyn ControlInput> {
        self.input
    }

    /// Starts the tick loop on a dedicated thread.
    pub fn spawn(self) -> io::Result<SamplerHandle> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let interval = self.settings.tick_interval();
        let thread = thread::Builder::new()
            .name("pitchpot-sampler".into())
            .spawn(move || self.run(&stop_rx, &done_tx, interval))?;
        Ok(SamplerHandle {
            stop_tx: Some(stop_tx),
            done_rx,
            thread: Some(thread),
        })
    }

    fn run(mut self, stop: &Receiver<()>, done: &Sender<()>, interval: Duration) -> Self {
        tracing::info!(
            input = %self.input.describe(),
            poll_hz = self.settings.poll_hz,
            alpha = self.smoother.alpha(),
            interval = ?self.settings.interval,
            "sampler started"
        );
        let ticker = crossbeam_channel::tick(interval);
        let mut last_tick = Instant::now();

        loop {
            let stopping = select! {
                recv(stop) -> _ => true,
                recv(ticker) -> now => {
                    let now = now.unwrap_or_else(|_| Instant::now());
                    match self.settings.interval {
                        SmoothingInterval::Nominal => self.tick(),
                        SmoothingInterval::Measured => {
                            let elapsed = now.saturating_duration_since(last_tick);
                            self.tick_after(elapsed)
                        }
                    };
                    last_tick = now;
                    false
                }
            };
            if stopping {
                break;
            }
        }

        tracing::info!(
            ticks = self.stats.ticks,
            published = self.stats.published,
            skipped = self.stats.skipped,
            "sampler stopped"
        );
        let _ = done.send(());
        self
    }

    fn read_target(&mut self) -> Result<ControlTarget, SkipReason> {
        let freq_channel = self.settings.frequency_channel;
        let amp_channel = self.settings.amplitude_channel;
        let freq_code = self.read_code(freq_channel)?;
        let amp_code = self.read_code(amp_channel)?;

        let mapping = &self.settings.mapping;
        let frequency_hz = mapping
            .frequency
            .map(freq_code)
            .ok_or(SkipReason::OutOfRange {
                channel: freq_channel,
                code: freq_code,
            })?;
        let amplitude = mapping
            .amplitude
            .map(amp_code)
            .ok_or(SkipReason::OutOfRange {
                channel: amp_channel,
                code: amp_code,
            })?;
        Ok(ControlTarget::new(frequency_hz, amplitude))
    }

    fn read_code(&mut self, channel: ChannelId) -> Result<u16, SkipReason> {
        self.input
            .read_channel(channel)
            .map_err(|error| SkipReason::Read { channel, error })
    }

    fn record_success(&mut self) {
        if self.warned {
            tracing::info!(
                failed_ticks = self.failure_streak,
                "control input recovered"
            );
        }
        self.failure_streak = 0;
        self.warned = false;
    }

    fn record_failure(&mut self, reason: &SkipReason) {
        self.failure_streak = self.failure_streak.saturating_add(1);
        tracing::debug!(reason = %reason, streak = self.failure_streak, "sampler tick skipped");
        if !reason.is_transient() {
            self.stats.persistent += 1;
            if !self.warned {
                self.warned = true;
                tracing::warn!(
                    reason = %reason,
                    "control input error will not clear on its own, holding last parameters"
                );
            }
            return;
        }
        if !self.warned && self.failure_streak >= self.settings.failure_warn_ticks() {
            self.warned = true;
            tracing::warn!(
                failed_ticks = self.failure_streak,
                reason = %reason,
                "control input failing, holding last parameters"
            );
        }
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("input", &self.input.describe())
            .field("settings", &self.settings)
            .field("current", &self.current)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// A sampler running on its own thread.
///
/// Dropping the handle without calling [`stop`](Self::stop) still signals the
/// loop to exit, but does not wait for it.
#[derive(Debug)]
pub struct SamplerHandle {
    stop_tx: Option<Sender<()>>,
    done_rx: Receiver<()>,
    thread: Option<JoinHandle<Sampler>>,
}

impl SamplerHandle {
    /// True while the tick loop is running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signals the loop to exit, waits up to `grace` for it to finish its
    /// current tick, then joins it and releases the control input.
    ///
    /// A tick blocked in a read past `grace` is still waited for, so the input
    /// is never released while in use.
    pub fn stop(mut self, grace: Duration) -> SamplerStats {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if self.done_rx.recv_timeout(grace).is_err() {
            tracing::warn!(
                grace_ms = grace.as_millis() as u64,
                "sampler still busy after grace period, waiting for current read"
            );
        }

        let Some(thread) = self.thread.take() else {
            return SamplerStats::default();
        };
        match thread.join() {
            Ok(sampler) => {
                let stats = sampler.stats();
                let input = sampler.into_input();
                let name = input.describe();
                drop(input);
                tracing::debug!(input = %name, "control input released");
                stats
            }
            Err(_) => {
                tracing::error!("sampler thread panicked");
                SamplerStats::default()
            }
        }
    }
}
