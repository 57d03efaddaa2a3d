//! Offline rendering in simulated time.
//!
//! Runs the sampler and the oscillator in lock-step without threads or
//! devices. Audio blocks advance a frame clock; before each block, every
//! sampler tick due at or before the block's first frame runs. Ticks fall at
//! multiples of the poll interval, the first one interval after start, which
//! matches the live sampler thread. The result is deterministic for a
//! deterministic input.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pitchpot_config::SynthConfig;
use pitchpot_core::{Oscillator, SmoothedParameters, WaveTable, parameter_channel};
use pitchpot_platform::{ControlInput, Sampler, SamplerStats};

use crate::session::sampler_settings;
use crate::wav::{WavSpec, write_wav};
use crate::Result;

/// Output of [`render_offline`].
#[derive(Debug, Clone)]
pub struct OfflineRender {
    /// Mono samples.
    pub samples: Vec<f32>,
    /// Sample rate of `samples`.
    pub sample_rate: u32,
    /// Sampler counters.
    pub stats: SamplerStats,
    /// Parameters in effect at the end of the render.
    pub final_parameters: SmoothedParameters,
}

impl OfflineRender {
    /// Rendered length.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Writes the samples as a mono 32-bit float WAV file.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<()> {
        write_wav(path, &self.samples, WavSpec::mono(self.sample_rate))
    }
}

/// Renders `duration` of mono audio driven by `input`.
///
/// Uses the audio, control and tone settings of `config`; the output channel
/// count and device are ignored.
pub fn render_offline(
    input: Box<dyn ControlInput>,
    config: &SynthConfig,
    duration: Duration,
) -> Result<OfflineRender> {
    config.validate()?;
    let settings = sampler_settings(config)?;
    let sample_rate = config.audio.sample_rate;
    let block = config.audio.buffer_size as usize;

    let (publisher, reader) = parameter_channel(config.initial_parameters());
    let table = Arc::new(WaveTable::new(config.audio.table_size));
    let mut oscillator = Oscillator::new(table, reader, sample_rate as f32);
    let mut sampler = Sampler::new(input, publisher, settings);

    let total = (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize;
    let tick_frames = f64::from(sample_rate) / f64::from(settings.poll_hz);
    let mut next_tick = tick_frames;
    let mut samples = vec![0.0f32; total];

    for (index, chunk) in samples.chunks_mut(block).enumerate() {
        let start = (index * block) as f64;
        while next_tick <= start {
            sampler.tick();
            next_tick += tick_frames;
        }
        oscillator.render(chunk);
    }

    let stats = sampler.stats();
    let final_parameters = sampler.current();
    tracing::info!(
        frames = total,
        sample_rate,
        ticks = stats.ticks,
        skipped = stats.skipped,
        "offline render complete"
    );

    Ok(OfflineRender {
        samples,
        sample_rate,
        stats,
        final_parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchpot_platform::ScriptedInput;

    #[test]
    fn zero_duration_renders_nothing() {
        let render = render_offline(
            Box::new(ScriptedInput::new()),
            &SynthConfig::default(),
            Duration::ZERO,
        )
        .unwrap();
        assert!(render.samples.is_empty());
        assert_eq!(render.stats.ticks, 0);
        assert_eq!(render.duration(), Duration::ZERO);
    }

    #[test]
    fn ticks_follow_poll_rate() {
        let mut config = SynthConfig::default();
        config.audio.sample_rate = 48000;
        config.audio.buffer_size = 480;
        config.control.poll_hz = 100.0;
        let render = render_offline(
            Box::new(ScriptedInput::new()),
            &config,
            Duration::from_secs(1),
        )
        .unwrap();
        // Blocks start every 10 ms; the tick at 1.0 s is never due.
        assert_eq!(render.samples.len(), 48000);
        assert_eq!(render.stats.ticks, 99);
        assert_eq!(render.stats.skipped, 99);
    }
}
