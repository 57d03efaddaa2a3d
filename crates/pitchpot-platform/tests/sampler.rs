//! Sampler behavior against scripted and constant inputs.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use pitchpot_core::{ControlMapping, ControlRange, SmoothedParameters, parameter_channel};
use pitchpot_platform::{
    ChannelId, ConstantInput, Sampler, SamplerSettings, ScriptStep, ScriptedInput, SkipReason,
    SmoothingInterval, TickOutcome,
};
use proptest::prelude::*;

const INITIAL: SmoothedParameters = SmoothedParameters::new(440.0, 0.2);

#[test]
fn failed_read_keeps_previous_snapshot() {
    let (publisher, reader) = parameter_channel(INITIAL);
    let input = ScriptedInput::new()
        .then_code(1023)
        .then_code(1023)
        .then_fail()
        .then_code(0)
        .then_code(0);
    let mut sampler = Sampler::new(Box::new(input), publisher, SamplerSettings::default());

    assert!(sampler.tick().is_published());
    let after_first = reader.read();
    assert!(after_first.frequency_hz > INITIAL.frequency_hz);

    let outcome = sampler.tick();
    assert!(matches!(
        outcome,
        TickOutcome::Skipped(SkipReason::Read { channel, ref error })
            if channel == ChannelId::CH5 && error.is_transient()
    ));
    assert_eq!(reader.read(), after_first);
    assert_eq!(sampler.current(), after_first);

    // Recovery picks up from the held value, not from the initial one.
    assert!(sampler.tick().is_published());
    assert!(reader.read().frequency_hz < after_first.frequency_hz);

    let stats = sampler.stats();
    assert_eq!((stats.ticks, stats.published, stats.skipped), (3, 2, 1));
}

#[test]
fn amplitude_failure_discards_frequency_read() {
    let (publisher, reader) = parameter_channel(INITIAL);
    let input = ScriptedInput::new().then_code(1023).then_fail();
    let mut sampler = Sampler::new(Box::new(input), publisher, SamplerSettings::default());

    let outcome = sampler.tick();
    assert!(matches!(
        outcome,
        TickOutcome::Skipped(SkipReason::Read { channel: ChannelId::CH6, .. })
    ));
    assert_eq!(reader.read(), INITIAL);
}

#[test]
fn garbage_code_is_skipped() {
    let (publisher, reader) = parameter_channel(INITIAL);
    let input = ScriptedInput::new().then_code(4000).then_code(10);
    let mut sampler = Sampler::new(Box::new(input), publisher, SamplerSettings::default());

    let outcome = sampler.tick();
    assert!(matches!(
        outcome,
        TickOutcome::Skipped(SkipReason::OutOfRange { code: 4000, .. })
    ));
    assert_eq!(reader.read(), INITIAL);
}

#[test]
fn reads_configured_channels() {
    let (publisher, _reader) = parameter_channel(INITIAL);
    let input = ScriptedInput::new().then_fail().then_code(1).then_fail();
    let settings = SamplerSettings {
        frequency_channel: ChannelId::CH0,
        amplitude_channel: ChannelId::CH7,
        ..SamplerSettings::default()
    };
    let mut sampler = Sampler::new(Box::new(input), publisher, settings);

    assert!(matches!(
        sampler.tick(),
        TickOutcome::Skipped(SkipReason::Read { channel: ChannelId::CH0, .. })
    ));
    assert!(matches!(
        sampler.tick(),
        TickOutcome::Skipped(SkipReason::Read { channel: ChannelId::CH7, .. })
    ));
}

#[test]
fn steady_input_converges() {
    let (publisher, reader) = parameter_channel(INITIAL);
    let input = ConstantInput::new()
        .with_code(ChannelId::CH5, 1023)
        .with_code(ChannelId::CH6, 1023);
    let mut sampler = Sampler::new(Box::new(input), publisher, SamplerSettings::default());
    for _ in 0..200 {
        sampler.tick();
    }
    let snap = reader.read();
    assert!((snap.frequency_hz - 2000.0).abs() < 0.01);
    assert!((snap.amplitude - 0.8).abs() < 1e-5);
}

#[test]
fn measured_interval_changes_coefficient() {
    let (publisher, _reader) = parameter_channel(INITIAL);
    let settings = SamplerSettings {
        interval: SmoothingInterval::Measured,
        ..SamplerSettings::default()
    };
    let mut sampler = Sampler::new(Box::new(ConstantInput::new()), publisher, settings);
    let nominal = sampler.smoother().alpha();

    sampler.tick_after(Duration::from_millis(30));
    assert!(sampler.smoother().alpha() > nominal);

    sampler.tick_after(Duration::from_millis(5));
    assert!(sampler.smoother().alpha() < nominal);
}

#[test]
fn thread_publishes_and_releases_input_on_stop() {
    let (publisher, reader) = parameter_channel(INITIAL);
    let steps = std::iter::repeat_n([ScriptStep::Code(1023), ScriptStep::Code(1023)], 1000).flatten();
    let input = ScriptedInput::from_steps(steps);
    let released = input.released_flag();
    let settings = SamplerSettings {
        poll_hz: 500.0,
        ..SamplerSettings::default()
    };

    let handle = Sampler::new(Box::new(input), publisher, settings)
        .spawn()
        .unwrap();
    assert!(handle.is_running());

    let deadline = Instant::now() + Duration::from_secs(5);
    while reader.read() == INITIAL && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!released.load(Ordering::Acquire));

    let stats = handle.stop(Duration::from_millis(100));
    assert!(stats.published > 0);
    assert!(released.load(Ordering::Acquire));
    assert!(reader.read().frequency_hz > INITIAL.frequency_hz);
}

#[test]
fn stop_does_not_wait_for_next_tick() {
    let (publisher, _reader) = parameter_channel(INITIAL);
    let settings = SamplerSettings {
        poll_hz: 0.5,
        ..SamplerSettings::default()
    };
    let handle = Sampler::new(Box::new(ConstantInput::new()), publisher, settings)
        .spawn()
        .unwrap();

    let started = Instant::now();
    let stats = handle.stop(Duration::from_millis(500));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(stats.ticks, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever the converter returns, published values stay inside the mapped ranges.
    #[test]
    fn published_values_stay_in_range(
        codes in prop::collection::vec(prop_oneof![0u16..=1023, 1024u16..=u16::MAX], 2..200),
    ) {
        let mapping = ControlMapping::new(
            ControlRange::new(100.0, 2000.0),
            ControlRange::new(0.0, 0.8),
        );
        let settings = SamplerSettings { mapping, ..SamplerSettings::default() };
        let (publisher, reader) = parameter_channel(INITIAL);
        let input = ScriptedInput::from_steps(codes.iter().copied().map(ScriptStep::Code));
        let mut sampler = Sampler::new(Box::new(input), publisher, settings);

        for _ in 0..codes.len() / 2 {
            sampler.tick();
            let snap = reader.read();
            prop_assert!((100.0..=2000.0).contains(&snap.frequency_hz), "{:?}", snap);
            prop_assert!((0.0..=0.8).contains(&snap.amplitude), "{:?}", snap);
        }
    }
}

/// Fails every read the way a vanished device node does.
struct VanishedDevice;

impl pitchpot_platform::ControlInput for VanishedDevice {
    fn read_channel(
        &mut self,
        _channel: ChannelId,
    ) -> Result<u16, pitchpot_platform::ControlError> {
        Err(pitchpot_platform::ControlError::Open {
            path: "/dev/spidev0.0".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

#[test]
fn persistent_errors_are_counted_apart_from_glitches() {
    let (publisher, reader) = parameter_channel(INITIAL);
    let mut sampler = Sampler::new(Box::new(VanishedDevice), publisher, SamplerSettings::default());

    for _ in 0..3 {
        match sampler.tick() {
            TickOutcome::Skipped(reason) => assert!(!reason.is_transient()),
            TickOutcome::Published(_) => panic!("vanished device published"),
        }
    }
    assert_eq!(reader.read(), INITIAL);
    let stats = sampler.stats();
    assert_eq!((stats.skipped, stats.persistent), (3, 3));

    let (publisher, _reader) = parameter_channel(INITIAL);
    let input = ScriptedInput::new().then_fail().then_code(4000).then_code(0);
    let mut sampler = Sampler::new(Box::new(input), publisher, SamplerSettings::default());
    sampler.tick();
    sampler.tick();
    let stats = sampler.stats();
    assert_eq!((stats.skipped, stats.persistent), (2, 0));
}

#[test]
fn unrepresentable_poll_interval_falls_back() {
    for poll_hz in [1e-20, 0.0, -1.0, f32::NAN] {
        let settings = SamplerSettings {
            poll_hz,
            ..SamplerSettings::default()
        };
        assert_eq!(settings.tick_interval(), Duration::from_secs(1), "poll_hz {poll_hz}");
    }
    let settings = SamplerSettings {
        poll_hz: 250.0,
        ..SamplerSettings::default()
    };
    assert!((settings.tick_interval().as_secs_f64() - 0.004).abs() < 1e-6);
}
