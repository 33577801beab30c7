// Visual transition collaborator
// The logical open/closed state never waits on transition progress; the
// transition only informs how the overlay is shaded while settling

use std::time::{Duration, SystemTime};

/// Enter/exit transition hooks for overlay content.
pub trait Transition {
    /// Called on the closed -> open edge.
    fn notify_enter(&mut self) {}
    /// Called on the open -> closed edge.
    fn notify_exit(&mut self) {}
    /// Progress of the current phase in `0.0..=1.0`.
    fn progress(&self) -> f32 {
        1.0
    }
}

/// No visual transition: content appears and disappears immediately.
#[derive(Debug, Default)]
pub struct NoTransition;

impl Transition for NoTransition {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadePhase {
    Idle,
    Entering,
    Exiting,
}

/// Time-based fade used to shade the backdrop while a dialog settles.
pub struct Fade {
    duration: Duration,
    phase: FadePhase,
    since: SystemTime, // MUST use SystemTime, not Instant
}

impl Fade {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            phase: FadePhase::Idle,
            since: SystemTime::now(),
        }
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(Duration::from_millis(220))
    }
}

impl Transition for Fade {
    fn notify_enter(&mut self) {
        self.phase = FadePhase::Entering;
        self.since = SystemTime::now();
    }

    fn notify_exit(&mut self) {
        self.phase = FadePhase::Exiting;
        self.since = SystemTime::now();
    }

    fn progress(&self) -> f32 {
        if self.phase == FadePhase::Idle {
            return 1.0;
        }
        let elapsed = self.since.elapsed().unwrap_or_default();
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_reports_full_progress_when_idle() {
        let fade = Fade::default();
        assert_eq!(fade.progress(), 1.0);
    }

    #[test]
    fn fade_progress_stays_in_range_after_enter() {
        let mut fade = Fade::new(Duration::from_millis(1));
        fade.notify_enter();
        let p = fade.progress();
        assert!((0.0..=1.0).contains(&p));
    }
}
