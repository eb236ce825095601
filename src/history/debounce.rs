use std::time::Duration;

/// Quiescence period used when none is configured
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

/// Deadline that keeps moving back while changes keep arriving.
///
/// Times come from a [`crate::util::Clock`]; the debouncer never reads a clock
/// itself.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arms the deadline, replacing any earlier one
    pub fn arm(&mut self, now: Duration) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether an armed deadline has passed
    pub fn is_due(&self, now: Duration) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn rearming_pushes_the_deadline_back() {
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.arm(ms(0));
        debouncer.arm(ms(200));
        assert!(!debouncer.is_due(ms(400)));
        assert!(debouncer.is_due(ms(500)));
    }

    #[test]
    fn idle_debouncer_is_never_due() {
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.is_due(ms(10_000)));
        debouncer.arm(ms(0));
        debouncer.cancel();
        assert!(!debouncer.is_armed());
        assert!(!debouncer.is_due(ms(10_000)));
    }
}
