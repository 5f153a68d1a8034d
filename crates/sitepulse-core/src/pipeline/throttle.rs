use std::time::Duration;
use tokio::time::Instant;

/// Rate gate for progress events of one run.
///
/// The first call always passes; afterwards a call passes only when
/// `interval` has elapsed since the last call that passed.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emitted: Option<Instant>,
}

impl ProgressThrottle {
    /// Create a throttle with the given minimum gap.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: None,
        }
    }

    /// Whether a progress event may be emitted now. Records the emission.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emitted {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_emitted = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_passes_then_gated() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(300));
        assert!(throttle.allow());
        assert!(!throttle.allow());

        tokio::time::advance(Duration::from_millis(299)).await;
        assert!(!throttle.allow());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(throttle.allow());
        assert!(!throttle.allow());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_suppresses() {
        let mut throttle = ProgressThrottle::new(Duration::ZERO);
        assert!(throttle.allow());
        assert!(throttle.allow());
    }
}
