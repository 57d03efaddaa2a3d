//! End-to-end tests for the control-to-audio path inside pitchpot-core.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use pitchpot_core::{
    ControlMapping, ControlRange, ControlTarget, Oscillator, ParameterChannel, ParameterSmoother,
    SmoothedParameters, WaveTable, parameter_channel,
};

#[test]
fn block_matches_closed_form() {
    let table = Arc::new(WaveTable::new(4096));
    let (_tx, rx) = parameter_channel(SmoothedParameters::new(440.0, 0.5));
    let mut osc = Oscillator::new(Arc::clone(&table), rx, 44100.0);

    let frames = 512;
    let mut block = vec![0.0f32; frames];
    osc.render(&mut block);

    assert_eq!(block[0], table.lookup(0) * 0.5);

    let step = 440.0f64 * 4096.0 / 44100.0;
    let last = ((step * (frames - 1) as f64).floor() as usize) % 4096;
    assert_eq!(block[frames - 1], table.lookup(last) * 0.5);
}

#[test]
fn code_extremes_map_to_range_ends() {
    let mapping = ControlMapping::new(
        ControlRange::new(100.0, 2000.0),
        ControlRange::new(0.0, 0.8),
    );
    assert_eq!(mapping.target(0, 0), Some(ControlTarget::new(100.0, 0.0)));
    assert_eq!(mapping.target(1023, 1023), Some(ControlTarget::new(2000.0, 0.8)));
}

#[test]
fn dyadic_step_is_bit_exact_across_blocks() {
    // 375 Hz at 48 kHz over 4096 entries advances exactly 32 entries per frame.
    let table = Arc::new(WaveTable::new(4096));
    let params = SmoothedParameters::new(375.0, 0.7);

    let (_a, a_rx) = parameter_channel(params);
    let mut whole = Oscillator::new(Arc::clone(&table), a_rx, 48000.0);
    let mut once = vec![0.0f32; 1024];
    whole.render(&mut once);

    let (_b, b_rx) = parameter_channel(params);
    let mut split = Oscillator::new(table, b_rx, 48000.0);
    let mut joined = Vec::with_capacity(1024);
    for _ in 0..4 {
        let mut block = [0.0f32; 256];
        split.render(&mut block);
        joined.extend_from_slice(&block);
    }

    assert_eq!(once, joined);
    assert_eq!(whole.phase(), split.phase());
}

#[test]
fn zero_frequency_holds_a_constant_sample() {
    let (tx, rx) = parameter_channel(SmoothedParameters::new(440.0, 0.5));
    let mut osc = Oscillator::new(Arc::new(WaveTable::new(4096)), rx, 44100.0);
    let mut block = [0.0f32; 100];
    osc.render(&mut block);

    tx.publish(SmoothedParameters::new(0.0, 0.5));
    let phase = osc.phase();
    osc.render(&mut block);
    assert!(block.iter().all(|&s| s == block[0]));
    assert_eq!(osc.phase(), phase);
}

#[test]
fn new_parameters_apply_at_next_block_without_phase_reset() {
    let (tx, rx) = parameter_channel(SmoothedParameters::new(440.0, 0.2));
    let mut osc = Oscillator::new(Arc::new(WaveTable::new(4096)), rx, 44100.0);
    let mut block = [0.0f32; 512];
    osc.render(&mut block);
    let phase = osc.phase();
    assert!(phase > 0.0);

    tx.publish(SmoothedParameters::new(1000.0, 0.8));
    let used = osc.render(&mut block);
    assert_eq!(used, SmoothedParameters::new(1000.0, 0.8));

    let step = 1000.0f64 * 4096.0 / 44100.0;
    let expected = (phase + step * 512.0).rem_euclid(4096.0);
    assert!((osc.phase() - expected).abs() < 1e-6);
}

#[test]
fn smoothed_sweep_reaches_target() {
    let mapping = ControlMapping::default();
    let smoother = ParameterSmoother::from_poll_rate(0.02, 100.0);
    let (tx, rx) = parameter_channel(SmoothedParameters::new(440.0, 0.2));

    let target = mapping.target(1023, 1023).unwrap();
    let mut current = tx.current();
    // One second of ticks is 50 time constants.
    for _ in 0..100 {
        current = smoother.step(current, target);
        tx.publish(current);
    }
    let seen = rx.read();
    assert!((seen.frequency_hz - 2000.0).abs() < 0.01);
    assert!((seen.amplitude - 0.8).abs() < 1e-5);
}

#[test]
fn concurrent_reads_are_never_torn() {
    // Each publication encodes its sequence number in both fields; a torn
    // read would pair two different numbers.
    let channel = Arc::new(ParameterChannel::new(SmoothedParameters::new(0.0, 0.0)));
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let channel = Arc::clone(&channel);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 1..=200_000u32 {
                let v = i as f32;
                channel.publish(SmoothedParameters::new(v, -v));
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut last = 0.0f32;
    let mut reads = 0u64;
    while !done.load(Ordering::Acquire) || reads == 0 {
        let snap = channel.read();
        assert_eq!(snap.amplitude, -snap.frequency_hz, "torn read: {snap:?}");
        assert!(snap.frequency_hz >= last, "went backwards: {snap:?}");
        last = snap.frequency_hz;
        reads += 1;
    }
    writer.join().unwrap();
    assert_eq!(channel.read(), SmoothedParameters::new(200_000.0, -200_000.0));
}
