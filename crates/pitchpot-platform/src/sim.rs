//! Hardware-free control inputs.
//!
//! Used for running without a converter attached (`--input sim` / `fixed`),
//! for offline rendering and in tests.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::input::{ChannelId, ControlError, ControlInput};
use pitchpot_core::MAX_CONTROL_CODE;

/// Returns the same code on every read of a channel.
///
/// Unset channels read as 0.
#[derive(Debug, Clone, Default)]
pub struct ConstantInput {
    codes: [u16; ChannelId::COUNT as usize],
}

impl ConstantInput {
    /// All channels at code 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the code returned for `channel`.
    pub fn with_code(mut self, channel: ChannelId, code: u16) -> Self {
        self.set_code(channel, code);
        self
    }

    /// Sets the code returned for `channel`.
    pub fn set_code(&mut self, channel: ChannelId, code: u16) {
        self.codes[usize::from(channel.index())] = code;
    }
}

impl ControlInput for ConstantInput {
    fn read_channel(&mut self, channel: ChannelId) -> Result<u16, ControlError> {
        Ok(self.codes[usize::from(channel.index())])
    }

    fn describe(&self) -> String {
        String::from("fixed input")
    }
}

/// Triangle sweep over the full code range.
///
/// Each channel runs its own sweep, advanced one step per read and offset by
/// an eighth of a period per channel index so two knobs never move in
/// lock-step.
#[derive(Debug, Clone)]
pub struct SweepInput {
    period: u32,
    positions: [u32; ChannelId::COUNT as usize],
}

impl SweepInput {
    /// A sweep that returns to its start every `period_reads` reads of a
    /// channel. Periods below 2 are raised to 2.
    pub fn new(period_reads: u32) -> Self {
        let period = period_reads.max(2);
        let mut positions = [0u32; ChannelId::COUNT as usize];
        for (i, pos) in positions.iter_mut().enumerate() {
            *pos = (period / u32::from(ChannelId::COUNT)) * i as u32 % period;
        }
        Self { period, positions }
    }

    /// Sweep length in reads.
    pub fn period(&self) -> u32 {
        self.period
    }
}

impl ControlInput for SweepInput {
    fn read_channel(&mut self, channel: ChannelId) -> Result<u16, ControlError> {
        let slot = &mut self.positions[usize::from(channel.index())];
        let pos = *slot;
        *slot = (pos + 1) % self.period;
        Ok(triangle(pos, self.period))
    }

    fn describe(&self) -> String {
        format!("sweep input ({} reads/period)", self.period)
    }
}

fn triangle(pos: u32, period: u32) -> u16 {
    let half = u64::from((period / 2).max(1));
    let pos = u64::from(pos);
    let rise = if pos < half {
        pos
    } else {
        u64::from(period) - pos
    };
    (rise * u64::from(MAX_CONTROL_CODE) / half).min(u64::from(MAX_CONTROL_CODE)) as u16
}

/// One scripted read result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    /// Return this code.
    Code(u16),
    /// Fail with a transient transfer error.
    Fail,
}

/// Reads recorded by a [`ScriptedInput`] before it stops recording.
pub const SCRIPT_READ_LOG: usize = 1024;

/// Plays back a fixed sequence of read results, one per read regardless of
/// channel, then reports [`ControlError::Exhausted`].
///
/// Records the channels of the first [`SCRIPT_READ_LOG`] reads, counts all of
/// them, and flags when it has been dropped.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    steps: VecDeque<ScriptStep>,
    reads: Vec<ChannelId>,
    read_count: u64,
    released: Arc<AtomicBool>,
}

impl ScriptedInput {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a script from a sequence of steps.
    pub fn from_steps(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        let mut input = Self::default();
        input.steps.extend(steps);
        input
    }

    /// Appends a successful read.
    pub fn then_code(mut self, code: u16) -> Self {
        self.steps.push_back(ScriptStep::Code(code));
        self
    }

    /// Appends a failed read.
    pub fn then_fail(mut self) -> Self {
        self.steps.push_back(ScriptStep::Fail);
        self
    }

    /// Channels of the recorded reads, in order.
    pub fn reads(&self) -> &[ChannelId] {
        &self.reads
    }

    /// Reads so far, including those past the recording limit.
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Flag that becomes `true` once this input is dropped.
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl ControlInput for ScriptedInput {
    fn read_channel(&mut self, channel: ChannelId) -> Result<u16, ControlError> {
        self.read_count += 1;
        if self.reads.len() < SCRIPT_READ_LOG {
            self.reads.push(channel);
        }
        match self.steps.pop_front() {
            Some(ScriptStep::Code(code)) => Ok(code),
            Some(ScriptStep::Fail) => Err(ControlError::Transfer(io::Error::other(
                "scripted transfer failure",
            ))),
            None => Err(ControlError::Exhausted),
        }
    }

    fn describe(&self) -> String {
        String::from("scripted input")
    }
}

impl Drop for ScriptedInput {
    fn drop(&mut self) {
        self.released.store(true, Ordering::Release);
    }
}
