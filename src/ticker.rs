use std::time::Duration;
use std::time::Instant;

use tracing::debug;

use crate::config::ConfigError;

/// Interval between ticks at `fps` ticks per second, rounded to the nearest millisecond. Never
/// shorter than one millisecond.
pub fn period_for(fps: u32) -> Result<Duration, ConfigError> {
    if fps == 0 {
        return Err(ConfigError::FrameRate);
    }

    let ms = (1000 + fps / 2) / fps;

    Ok(Duration::from_millis(ms.max(1) as u64))
}

/// A periodic interval driven by polling. The owner asks whether a tick is due; nothing runs in
/// the background, so two ticks can never overlap.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,

    /// When the next tick is due
    next: Instant,
}

impl Ticker {
    /// Start ticking at `fps`. The first tick is due one period after `now`.
    pub fn new(fps: u32, now: Instant) -> Result<Self, ConfigError> {
        let period = period_for(fps)?;

        Ok(Self {
            period,
            next: now + period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the next tick is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Returns true when a tick is due, and schedules the following one.
    ///
    /// When the caller fell behind by a whole period or more, the missed ticks are dropped and
    /// only one fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }

        let late = now - self.next;

        if late >= self.period {
            let skipped = (late.as_nanos() / self.period.as_nanos()) as u64;
            debug!(skipped, "dropping overdue ticks");

            self.next = now + self.period;
        } else {
            self.next += self.period;
        }

        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn periods() {
        assert_eq!(period_for(1).unwrap(), ms(1000));
        assert_eq!(period_for(3).unwrap(), ms(333));
        assert_eq!(period_for(7).unwrap(), ms(143));
        assert_eq!(period_for(60).unwrap(), ms(17));
        assert_eq!(period_for(5000).unwrap(), ms(1));
        assert_eq!(period_for(0), Err(ConfigError::FrameRate));
    }

    #[test]
    fn fires_once_per_period() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(10, t0).unwrap();

        assert!(!ticker.poll(t0));
        assert!(!ticker.poll(t0 + ms(99)));
        assert!(ticker.poll(t0 + ms(100)));
        assert!(!ticker.poll(t0 + ms(150)));

        // slightly late, the schedule does not drift
        assert!(ticker.poll(t0 + ms(230)));
        assert_eq!(ticker.remaining(t0 + ms(230)), ms(70));
    }

    #[test]
    fn overdue_ticks_are_dropped() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(10, t0).unwrap();

        assert!(ticker.poll(t0 + ms(550)));
        assert!(!ticker.poll(t0 + ms(550)));
        assert!(!ticker.poll(t0 + ms(600)));
        assert!(ticker.poll(t0 + ms(650)));
    }

    #[test]
    fn remaining_saturates() {
        let t0 = Instant::now();
        let ticker = Ticker::new(4, t0).unwrap();

        assert_eq!(ticker.period(), ms(250));
        assert_eq!(ticker.remaining(t0), ms(250));
        assert_eq!(ticker.remaining(t0 + ms(400)), Duration::ZERO);
    }
}
