//! Live synth sessions.
//!
//! A [`SynthSession`] owns the two concurrent halves of the synth: the output
//! stream, whose callback renders from an [`Oscillator`], and the sampler
//! thread that feeds it through a parameter channel. The two share nothing
//! else.
//!
//! Start order is input, then stream, then sampler thread, so a stream that
//! fails to open releases the control input before any tick runs. Stop order
//! is the reverse: the stream is dropped first (no further callbacks, the
//! in-flight one completes), then the sampler is stopped and the input
//! released.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use pitchpot_config::{SmoothingMode, SynthConfig, ValidationError};
use pitchpot_core::{Oscillator, ParameterReader, SmoothedParameters, WaveTable, parameter_channel};
use pitchpot_platform::{
    ChannelId, ControlInput, Sampler, SamplerHandle, SamplerSettings, SamplerStats,
    SmoothingInterval,
};

use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};
use crate::{Error, Result};

/// Builds sampler settings from a configuration.
pub fn sampler_settings(config: &SynthConfig) -> Result<SamplerSettings> {
    let channel = |field: &'static str, index: u8| {
        ChannelId::new(index).ok_or(ValidationError::InvalidChannel {
            field,
            channel: index,
        })
    };
    let control = &config.control;

    Ok(SamplerSettings {
        poll_hz: control.poll_hz,
        frequency_channel: channel("control.frequency_channel", control.frequency_channel)?,
        amplitude_channel: channel("control.amplitude_channel", control.amplitude_channel)?,
        mapping: config.mapping(),
        smoothing_tau_s: config.tone.smoothing_tau_s,
        interval: match config.tone.smoothing_interval {
            SmoothingMode::Nominal => SmoothingInterval::Nominal,
            SmoothingMode::Measured => SmoothingInterval::Measured,
        },
    })
}

/// What a session did, reported when it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Sampler counters; `None` for a fixed tone.
    pub sampler: Option<SamplerStats>,
    /// Stream faults reported by the backend.
    pub faults: u64,
    /// Time from start to stop.
    pub uptime: Duration,
}

/// Fault state shared between the error callback, the render callback and
/// the session.
#[derive(Debug, Default)]
struct FaultState {
    count: AtomicU64,
    faulted: AtomicBool,
}

/// A running synth: output stream plus (optionally) the sampler thread.
///
/// Must stay on the thread that started it; some platform streams are not
/// `Send`.
#[derive(Debug)]
pub struct SynthSession {
    stream: Option<StreamHandle>,
    sampler: Option<SamplerHandle>,
    faults: Arc<FaultState>,
    fault_rx: Receiver<String>,
    first_fault: Option<String>,
    started: Instant,
}

impl SynthSession {
    /// Starts a session driven by `input`.
    ///
    /// The configuration is validated first. On any error the input has been
    /// released by the time this returns.
    pub fn start(
        backend: &dyn AudioBackend,
        input: Box<dyn ControlInput>,
        config: &SynthConfig,
    ) -> Result<Self> {
        config.validate()?;
        let settings = sampler_settings(config)?;
        let description = input.describe();

        let (publisher, reader) = parameter_channel(config.initial_parameters());
        let sampler = Sampler::new(input, publisher, settings);

        let mut session = Self::open(backend, reader, config)?;
        session.sampler = Some(sampler.spawn()?);

        tracing::info!(
            backend = backend.name(),
            input = %description,
            poll_hz = settings.poll_hz,
            frequency_channel = %settings.frequency_channel,
            amplitude_channel = %settings.amplitude_channel,
            "synth session started"
        );
        Ok(session)
    }

    /// Starts a session that plays a constant tone with no control input.
    pub fn start_tone(
        backend: &dyn AudioBackend,
        config: &SynthConfig,
        tone: SmoothedParameters,
    ) -> Result<Self> {
        config.validate()?;
        let nyquist = config.audio.sample_rate as f32 / 2.0;
        if tone.frequency_hz.is_nan() || tone.frequency_hz <= 0.0 || tone.frequency_hz >= nyquist {
            return Err(ValidationError::OutOfRange {
                field: "frequency",
                value: f64::from(tone.frequency_hz),
                min: 0.0,
                max: f64::from(nyquist),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&tone.amplitude) {
            return Err(ValidationError::OutOfRange {
                field: "amplitude",
                value: f64::from(tone.amplitude),
                min: 0.0,
                max: 1.0,
            }
            .into());
        }

        let (_publisher, reader) = parameter_channel(tone);
        let session = Self::open(backend, reader, config)?;
        tracing::info!(
            backend = backend.name(),
            frequency_hz = tone.frequency_hz,
            amplitude = tone.amplitude,
            "tone session started"
        );
        Ok(session)
    }

    fn open(
        backend: &dyn AudioBackend,
        reader: ParameterReader,
        config: &SynthConfig,
    ) -> Result<Self> {
        let table = Arc::new(WaveTable::new(config.audio.table_size));
        let mut oscillator = Oscillator::new(table, reader, config.audio.sample_rate as f32);
        let channels = usize::from(config.audio.channels);

        let faults = Arc::new(FaultState::default());
        let (fault_tx, fault_rx) = crossbeam_channel::bounded::<String>(1);

        let render_faults = Arc::clone(&faults);
        let callback = Box::new(move |data: &mut [f32]| {
            if render_faults.faulted.load(Ordering::Acquire) {
                data.fill(0.0);
                return;
            }
            oscillator.render_interleaved(data, channels);
        });

        let error_faults = Arc::clone(&faults);
        let error_callback = Box::new(move |message: &str| {
            report_fault(&error_faults, &fault_tx, message);
        });

        let stream = backend.build_output_stream(
            &BackendStreamConfig::from(&config.audio),
            callback,
            error_callback,
        )?;

        Ok(Self {
            stream: Some(stream),
            sampler: None,
            faults,
            fault_rx,
            first_fault: None,
            started: Instant::now(),
        })
    }

    /// Stream faults reported so far.
    pub fn fault_count(&self) -> u64 {
        self.faults.count.load(Ordering::Acquire)
    }

    /// Fails once the stream has reported a fault.
    ///
    /// A faulted stream outputs silence; the session should be stopped.
    pub fn check(&mut self) -> Result<()> {
        if self.fault_count() == 0 {
            return Ok(());
        }
        if self.first_fault.is_none() {
            self.first_fault = self.fault_rx.try_recv().ok();
        }
        Err(Error::Stream(
            self.first_fault
                .clone()
                .unwrap_or_else(|| String::from("output stream fault")),
        ))
    }

    /// True while the sampler thread is running. Always false for a tone.
    pub fn sampler_running(&self) -> bool {
        self.sampler.as_ref().is_some_and(SamplerHandle::is_running)
    }

    /// Time since the session started.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops output, then the sampler, waiting up to `grace` for its current
    /// tick before releasing the control input.
    pub fn stop(mut self, grace: Duration) -> SessionSummary {
        drop(self.stream.take());
        tracing::debug!("output stream closed");

        let sampler = self.sampler.take().map(|handle| handle.stop(grace));
        let summary = SessionSummary {
            sampler,
            faults: self.fault_count(),
            uptime: self.uptime(),
        };
        tracing::info!(
            uptime_s = summary.uptime.as_secs_f64(),
            faults = summary.faults,
            ticks = sampler.map_or(0, |s| s.ticks),
            skipped = sampler.map_or(0, |s| s.skipped),
            "synth session stopped"
        );
        summary
    }
}

fn report_fault(faults: &FaultState, first: &Sender<String>, message: &str) {
    let count = faults.count.fetch_add(1, Ordering::AcqRel) + 1;
    faults.faulted.store(true, Ordering::Release);
    let _ = first.try_send(message.to_owned());
    tracing::error!(faults = count, error = message, "output stream fault");
}
