use std::time::Duration;

use tokio::time::Instant;

/// "Next due" guard for one periodic action.
///
/// Cadence is measured from actual execution time: after firing, the next
/// deadline is `now + period`, not `next_due + period`. Drift is allowed,
/// catch-up storms after a stall are not. This is why `tokio::time::interval`
/// is not used here.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    period: Duration,
    next_due: Instant,
}

impl Cadence {
    /// A cadence that is due immediately and then every `period`.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Whether the action is due at `now`; if so, re-arm from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now >= self.next_due {
            self.next_due = now + self.period;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fire_counts_over_simulated_minute() {
        let base = Instant::now();
        let mut sample = Cadence::new(Duration::from_millis(500), base);
        let mut deliver = Cadence::new(Duration::from_millis(30_000), base);
        let mut time_write = Cadence::new(Duration::from_millis(10_000), base);

        let mut fires = [0u32; 3];
        // 20 ms tick, as the engine loop runs it.
        for ms in (0..60_000u64).step_by(20) {
            let now = base + Duration::from_millis(ms);
            let cadences = [&mut sample, &mut deliver, &mut time_write];
            for (cadence, count) in cadences.into_iter().zip(fires.iter_mut()) {
                let due_at = cadence.next_due();
                if cadence.poll(now) {
                    assert!(now >= due_at);
                    *count += 1;
                }
            }
        }

        assert!((119..=121).contains(&fires[0]), "sample fired {}", fires[0]);
        assert_eq!(fires[1], 2);
        assert_eq!(fires[2], 6);
    }

    #[tokio::test(start_paused = true)]
    async fn rearms_from_execution_time_not_deadline() {
        let base = Instant::now();
        let mut cadence = Cadence::new(Duration::from_millis(500), base);
        assert!(cadence.poll(base));

        // Stall for three periods; exactly one catch-up fire, then the
        // schedule restarts from the late execution time.
        let late = base + Duration::from_millis(1_700);
        assert!(cadence.poll(late));
        assert!(!cadence.poll(late + Duration::from_millis(499)));
        assert!(cadence.poll(late + Duration::from_millis(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn not_due_before_period_elapses() {
        let base = Instant::now();
        let mut cadence = Cadence::new(Duration::from_millis(500), base);
        assert!(cadence.poll(base));
        assert!(!cadence.poll(base + Duration::from_millis(480)));
        assert!(cadence.poll(base + Duration::from_millis(500)));
    }
}
