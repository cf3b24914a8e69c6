pub const FOCUS_BURST_SECS: u32 = 5 * 60;

/// Countdown state for the focus burst. Driven by a 1 Hz subscription;
/// exactly one `Completed` is emitted, on the tick that reaches zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FocusTimer {
    #[default]
    Idle,
    Running {
        remaining: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Idle,
    Ticked,
    Completed,
}

impl FocusTimer {
    /// Starts a new burst. Starting while one is running is a no-op.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        *self = FocusTimer::Running {
            remaining: FOCUS_BURST_SECS,
        };
        true
    }

    pub fn tick(&mut self) -> TimerEvent {
        match self {
            FocusTimer::Idle => TimerEvent::Idle,
            FocusTimer::Running { remaining } => {
                *remaining -= 1;
                if *remaining == 0 {
                    *self = FocusTimer::Idle;
                    TimerEvent::Completed
                } else {
                    TimerEvent::Ticked
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, FocusTimer::Running { .. })
    }

    /// `MM:SS` while running, empty when idle.
    pub fn display(&self) -> String {
        match self {
            FocusTimer::Idle => String::new(),
            FocusTimer::Running { remaining } => {
                format!("{:02}:{:02}", remaining / 60, remaining % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_exactly_once_after_full_duration() {
        let mut timer = FocusTimer::default();
        assert!(timer.start());
        for i in 1..FOCUS_BURST_SECS {
            assert_eq!(timer.tick(), TimerEvent::Ticked, "tick {}", i);
        }
        assert_eq!(timer.tick(), TimerEvent::Completed);
        assert_eq!(timer.tick(), TimerEvent::Idle);
        assert!(!timer.is_running());
    }

    #[test]
    fn start_while_running_is_a_noop() {
        let mut timer = FocusTimer::default();
        assert!(timer.start());
        timer.tick();
        assert!(!timer.start());
        assert_eq!(
            timer,
            FocusTimer::Running {
                remaining: FOCUS_BURST_SECS - 1
            }
        );
    }

    #[test]
    fn display_formats_minutes_and_seconds() {
        let mut timer = FocusTimer::default();
        assert_eq!(timer.display(), "");
        timer.start();
        assert_eq!(timer.display(), "05:00");
        timer.tick();
        assert_eq!(timer.display(), "04:59");
    }
}
