//! Eyelid-blink detection — per-eye hysteresis state machines plus a
//! synchronized double-blink combiner.
//!
//! Each eye runs a two-state machine over the continuous closure signal:
//! Open → Closing when the signal rises above the close threshold, and
//! Closing → Open (one completed blink) when it falls below the open
//! threshold. Values inside the hysteresis band cause no transition, which
//! keeps a signal hovering near the midpoint from chattering. Both eyes
//! completing on the same sample is a synchronized blink; two of those
//! within the configured window form a double-blink gesture.

use std::collections::VecDeque;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::sample::TrackingSample;

/// Bounded diagnostic history of completed blinks.
const BLINK_HISTORY_CAP: usize = 50;

// ── Eye ──────────────────────────────────────────────────────

/// Which eye a blink event belongs to. Also indexes the per-eye state pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left = 0,
    Right = 1,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

// ── Blink phase ──────────────────────────────────────────────

/// Hysteresis state for one eye. Lives for the whole session; never reset
/// by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    Open,
    Closing,
}

/// Per-eye state: current phase plus the timestamp of the last transition.
#[derive(Debug, Clone, Copy)]
struct EyeState {
    phase: BlinkPhase,
    last_transition_s: f64,
}

impl EyeState {
    fn new() -> Self {
        Self {
            phase: BlinkPhase::Open,
            last_transition_s: 0.0,
        }
    }
}

// ── Events ───────────────────────────────────────────────────

/// A completed per-eye blink (Closing → Open transition).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkCompleted {
    pub eye: Eye,
    pub timestamp_s: f64,
}

/// Events produced by blink evaluation for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlinkEvent {
    /// One eye finished a blink.
    Completed(BlinkCompleted),
    /// Both eyes finished a blink on the same sample.
    Synchronized { timestamp_s: f64 },
    /// Two synchronized blinks landed within the gesture window.
    DoubleBlink { timestamp_s: f64 },
}

// ── BlinkDetector ────────────────────────────────────────────

/// Per-eye blink state machines plus the double-blink combiner.
#[derive(Debug)]
pub struct BlinkDetector {
    /// Indexed by `Eye as usize`.
    eyes: [EyeState; 2],
    /// Timestamp of the most recent synchronized blink.
    last_synchronized_s: Option<f64>,
    /// Recent completions, for diagnostics.
    history: VecDeque<BlinkCompleted>,
}

impl BlinkDetector {
    pub fn new() -> Self {
        Self {
            eyes: [EyeState::new(), EyeState::new()],
            last_synchronized_s: None,
            history: VecDeque::with_capacity(BLINK_HISTORY_CAP),
        }
    }

    /// Evaluate one tracking sample. An eye whose pose is absent this frame
    /// is skipped entirely (its state machine does not advance).
    pub fn update(&mut self, sample: &TrackingSample, config: &EngineConfig) -> Vec<BlinkEvent> {
        let mut events = Vec::new();
        let mut completed_this_frame = [false; 2];

        for eye in Eye::BOTH {
            let (present, closure) = match eye {
                Eye::Left => (sample.left_eye.is_some(), sample.left_closure),
                Eye::Right => (sample.right_eye.is_some(), sample.right_closure),
            };
            if !present {
                continue;
            }

            if let Some(completion) = self.step_eye(eye, closure, sample.timestamp_s, config) {
                completed_this_frame[eye as usize] = true;
                events.push(BlinkEvent::Completed(completion));
                self.push_history(completion);
            }
        }

        if completed_this_frame[Eye::Left as usize] && completed_this_frame[Eye::Right as usize] {
            events.push(BlinkEvent::Synchronized {
                timestamp_s: sample.timestamp_s,
            });

            if let Some(previous) = self.last_synchronized_s {
                let gap = sample.timestamp_s - previous;
                if gap <= config.double_blink_window_s() {
                    info!("double blink gesture ({:.2}s apart)", gap);
                    events.push(BlinkEvent::DoubleBlink {
                        timestamp_s: sample.timestamp_s,
                    });
                }
            }
            // Always advance the window anchor, so a rapid triple blink
            // yields one gesture per qualifying pair, not a cascade.
            self.last_synchronized_s = Some(sample.timestamp_s);
        }

        events
    }

    /// Advance one eye's hysteresis machine. Returns the completion if the
    /// eye just reopened.
    fn step_eye(
        &mut self,
        eye: Eye,
        closure: f32,
        timestamp_s: f64,
        config: &EngineConfig,
    ) -> Option<BlinkCompleted> {
        let state = &mut self.eyes[eye as usize];
        match state.phase {
            BlinkPhase::Open if closure > config.blink_close_threshold() => {
                state.phase = BlinkPhase::Closing;
                state.last_transition_s = timestamp_s;
                debug!("{} eye closing at {:.3}s", eye.as_str(), timestamp_s);
                None
            }
            BlinkPhase::Closing if closure < config.blink_open_threshold() => {
                state.phase = BlinkPhase::Open;
                state.last_transition_s = timestamp_s;
                debug!("{} eye blink completed at {:.3}s", eye.as_str(), timestamp_s);
                Some(BlinkCompleted { eye, timestamp_s })
            }
            // Inside the hysteresis band, or no threshold crossed.
            _ => None,
        }
    }

    fn push_history(&mut self, completion: BlinkCompleted) {
        if self.history.len() >= BLINK_HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(completion);
    }

    /// Current phase of one eye.
    pub fn phase(&self, eye: Eye) -> BlinkPhase {
        self.eyes[eye as usize].phase
    }

    /// Timestamp of one eye's last phase transition.
    pub fn last_transition_s(&self, eye: Eye) -> f64 {
        self.eyes[eye as usize].last_transition_s
    }

    /// Recent blink completions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &BlinkCompleted> {
        self.history.iter()
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
