//! # Morph Timeline
//!
//! A restartable eased transition from one progress value to another.
//!
//! The timeline is anchored lazily: the first [`MorphTimeline::advance`] after
//! a start records the clock and yields the start value, so a restart never
//! jumps. Values are computed in closed form from the start/target pair, never
//! accumulated, and completion lands on the target exactly.

use crate::animation::{lerp, EasingType};

/// Default transition length in milliseconds.
pub const MORPH_DURATION_MS: f64 = 1000.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TimelineState {
    Idle,
    Running {
        from: f64,
        to: f64,
        /// Clock value of the first advance; `None` until then.
        started_at: Option<f64>,
    },
    /// Terminal: the owner was destroyed.
    Disposed,
}

#[derive(Clone, Debug)]
pub struct MorphTimeline {
    pub state: TimelineState,
    pub duration: f64,
    pub easing: EasingType,
}

impl Default for MorphTimeline {
    fn default() -> Self {
        Self::new(MORPH_DURATION_MS, EasingType::default())
    }
}

impl MorphTimeline {
    pub fn new(duration: f64, easing: EasingType) -> Self {
        Self {
            state: TimelineState::Idle,
            duration,
            easing,
        }
    }

    /// Starts (or restarts) a transition from `from` to `to`.
    ///
    /// Any running transition is replaced. Ignored once disposed.
    pub fn start(&mut self, from: f64, to: f64) {
        if self.state == TimelineState::Disposed {
            return;
        }
        self.state = TimelineState::Running {
            from,
            to,
            started_at: None,
        };
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimelineState::Running { .. })
    }

    /// Moves the transition to clock time `now` (milliseconds).
    ///
    /// Returns the new progress while running, `None` when idle or disposed.
    /// The call that reaches the end returns exactly `to` and goes idle.
    pub fn advance(&mut self, now: f64) -> Option<f64> {
        let TimelineState::Running {
            from,
            to,
            started_at,
        } = self.state
        else {
            return None;
        };

        let started_at = started_at.unwrap_or(now);
        let t = if self.duration > 0.0 {
            ((now - started_at) / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let fraction = self.easing.eval(t);

        self.state = if t >= 1.0 {
            TimelineState::Idle
        } else {
            TimelineState::Running {
                from,
                to,
                started_at: Some(started_at),
            }
        };

        Some(lerp(from, to, fraction))
    }

    /// Drops any transition for good.
    pub fn dispose(&mut self) {
        self.state = TimelineState::Disposed;
    }
}
