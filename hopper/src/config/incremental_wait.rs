use std::time::Duration;

/// Idle delay applied when no backoff schedule has been configured.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(100);

/// The idle backoff schedule followed by producer workers while their queue is empty.
///
/// Each consecutive idle cycle sleeps for the next entry in the schedule. Once the final entry
/// is reached, the schedule saturates and keeps repeating it until new work arrives, at which
/// point the worker starts again from the first entry. An empty schedule always yields
/// [DEFAULT_IDLE_DELAY].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncrementalWait(Vec<Duration>);

impl IncrementalWait {
    pub fn linear(steps: u32, step: Duration) -> Self {
        let schedule = (1..=steps).map(|i| step.saturating_mul(i)).collect();
        Self(schedule)
    }

    pub fn constant(delay: Duration) -> Self {
        Self(vec![delay])
    }

    /// Builds `step * factor^i` for each of `steps` entries, saturating at [Duration::MAX].
    pub fn exponential(steps: u32, factor: u32, step: Duration) -> Self {
        let schedule = (0..steps)
            .map(|i| match factor.checked_pow(i) {
                Some(multiplier) => step.saturating_mul(multiplier),
                None => Duration::MAX,
            })
            .collect();

        Self(schedule)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the delay for the idle cycle at `index`, clamped to the final entry.
    pub fn delay(&self, index: usize) -> Duration {
        match self.0.last() {
            Some(last) => self.0.get(index).copied().unwrap_or(*last),
            None => DEFAULT_IDLE_DELAY,
        }
    }

    pub fn as_slice(&self) -> &[Duration] {
        &self.0
    }
}

impl From<&[Duration]> for IncrementalWait {
    fn from(value: &[Duration]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Vec<Duration>> for IncrementalWait {
    fn from(value: Vec<Duration>) -> Self {
        Self(value)
    }
}

impl std::cmp::PartialEq<&[Duration]> for IncrementalWait {
    fn eq(&self, other: &&[Duration]) -> bool {
        &self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn generates_linear_schedule() {
        let mut rng = rand::thread_rng();

        let steps = rng.gen_range(3..5);
        let step = Duration::from_millis(rng.gen_range(1..50));

        let schedule = IncrementalWait::linear(steps, step);
        let expected = (1..=steps).map(|i| i * step).collect::<Vec<_>>();

        assert_eq!(schedule, &expected[..]);
    }

    #[test]
    fn generates_exponential_schedule() {
        let mut rng = rand::thread_rng();

        let steps = rng.gen_range(3..5);
        let factor = rng.gen_range(2..5);
        let step = Duration::from_millis(rng.gen_range(1..50));

        let schedule = IncrementalWait::exponential(steps, factor, step);
        let expected = (0..steps)
            .map(|i| step * factor.pow(i))
            .collect::<Vec<_>>();

        assert_eq!(schedule, &expected[..]);
    }

    #[test]
    fn exponential_schedule_saturates_instead_of_overflowing() {
        let schedule = IncrementalWait::exponential(40, 2, Duration::from_millis(10));

        assert_eq!(schedule.len(), 40);
        assert_eq!(schedule.delay(3), Duration::from_millis(80));
        assert_eq!(schedule.delay(32), Duration::MAX);
        assert_eq!(schedule.delay(100), Duration::MAX);
    }

    #[test]
    fn empty_schedule_uses_default_delay() {
        let schedule = IncrementalWait::default();

        assert_eq!(schedule.delay(0), DEFAULT_IDLE_DELAY);
        assert_eq!(schedule.delay(7), DEFAULT_IDLE_DELAY);
    }

    #[test]
    fn delay_saturates_at_last_entry() {
        let millis = |ms| Duration::from_millis(ms);
        let schedule = IncrementalWait::from(vec![millis(10), millis(20), millis(40)]);

        let delays = (0..6).map(|i| schedule.delay(i)).collect::<Vec<_>>();

        assert_eq!(
            delays,
            vec![millis(10), millis(20), millis(40), millis(40), millis(40), millis(40)]
        );
    }
}
