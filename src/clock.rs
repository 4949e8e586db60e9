use core::sync::atomic::{AtomicU32, Ordering};

/// Monotonic millisecond time source.
///
/// The counter is free-running and wraps around after exhausting `u32`, so
/// every comparison goes through [`Clock::elapsed`] rather than arithmetic
/// on absolute values.
pub trait Clock {
    /// Snapshot of the wrapping millisecond counter.
    fn now_ms(&self) -> u32;

    /// Whether `duration_ms` has passed since `start_ms`, correct across
    /// counter wraparound. A zero duration has always elapsed.
    fn elapsed(&self, start_ms: u32, duration_ms: u32) -> bool {
        self.now_ms().wrapping_sub(start_ms) >= duration_ms
    }

    /// Busy-wait for `duration_ms`.
    fn delay_ms(&self, duration_ms: u32) {
        let start = self.now_ms();
        while !self.elapsed(start, duration_ms) {}
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// One overall time budget shared by the steps of a multi-step operation.
///
/// Later steps ask for the remaining allowance, which shrinks as earlier
/// steps consume it and saturates at zero once the budget is spent. A zero
/// remainder means the operation has already timed out; callers must treat
/// it as expired instead of issuing another transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    start_ms: u32,
    budget_ms: u32,
}

impl Deadline {
    /// Begin a budget of `budget_ms` at the clock's current time.
    pub fn start(clock: &impl Clock, budget_ms: u32) -> Self {
        Deadline {
            start_ms: clock.now_ms(),
            budget_ms,
        }
    }

    /// Milliseconds left, zero once the budget is exhausted.
    pub fn remaining_ms(&self, clock: &impl Clock) -> u32 {
        self.budget_ms
            .saturating_sub(clock.now_ms().wrapping_sub(self.start_ms))
    }

    pub fn expired(&self, clock: &impl Clock) -> bool {
        self.remaining_ms(clock) == 0
    }
}

/// Free-running millisecond counter fed by a periodic interrupt.
///
/// Place one in a `static` and call [`TickCounter::tick`] from the 1 ms
/// tick handler; everything else reads it through the [`Clock`] impl.
#[derive(Debug, Default)]
pub struct TickCounter {
    ms: AtomicU32,
}

impl TickCounter {
    pub const fn new() -> Self {
        TickCounter {
            ms: AtomicU32::new(0),
        }
    }

    /// Advance the counter by one millisecond.
    pub fn tick(&self) {
        self.ms.fetch_add(1, Ordering::Relaxed);
    }
}

impl Clock for TickCounter {
    fn now_ms(&self) -> u32 {
        self.ms.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct TestClock(Cell<u32>);

    impl TestClock {
        fn at(now: u32) -> Self {
            TestClock(Cell::new(now))
        }
    }

    impl Clock for TestClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    #[test_log::test]
    fn elapsed_without_wraparound() {
        let clock = TestClock::at(1000);
        assert!(clock.elapsed(500, 400));
        assert!(clock.elapsed(500, 500));
        assert!(!clock.elapsed(500, 501));
    }

    #[test_log::test]
    fn elapsed_when_now_wrapped_but_end_did_not() {
        // start near the top of the range, now wrapped past zero, and
        // start + duration would not have wrapped: time must have passed
        let clock = TestClock::at(0x0000_0010);
        assert!(clock.elapsed(0xFFFF_FF00, 0x80));
    }

    #[test_log::test]
    fn elapsed_when_both_wrapped() {
        let clock = TestClock::at(0x0000_0200);
        assert!(clock.elapsed(0xFFFF_FF00, 0x200));
        assert!(!clock.elapsed(0xFFFF_FF00, 0x400));
    }

    #[test_log::test]
    fn not_elapsed_when_end_wraps_ahead_of_now() {
        // now has not wrapped yet but start + duration lands past the wrap
        let clock = TestClock::at(0xFFFF_FF80);
        assert!(!clock.elapsed(0xFFFF_FF00, 0x200));
    }

    #[test_log::test]
    fn zero_duration_is_always_elapsed() {
        assert!(TestClock::at(0).elapsed(0, 0));
        assert!(TestClock::at(0xFFFF_FFFF).elapsed(0xFFFF_FFFF, 0));
        assert!(TestClock::at(5).elapsed(0xFFFF_FFF0, 0));
    }

    #[test_log::test]
    fn deadline_remaining_shrinks_and_saturates() {
        let clock = TestClock::at(100);
        let deadline = Deadline::start(&clock, 50);
        assert_eq!(deadline.remaining_ms(&clock), 50);

        clock.0.set(130);
        assert_eq!(deadline.remaining_ms(&clock), 20);
        assert!(!deadline.expired(&clock));

        // past the budget: remainder pins at zero instead of underflowing
        clock.0.set(200);
        assert_eq!(deadline.remaining_ms(&clock), 0);
        assert!(deadline.expired(&clock));
    }

    #[test_log::test]
    fn deadline_survives_counter_wraparound() {
        let clock = TestClock::at(0xFFFF_FFF0);
        let deadline = Deadline::start(&clock, 0x40);

        clock.0.set(0x0000_0010);
        assert_eq!(deadline.remaining_ms(&clock), 0x20);

        clock.0.set(0x0000_0040);
        assert!(deadline.expired(&clock));
    }

    #[test_log::test]
    fn tick_counter_counts_and_wraps() {
        let counter = TickCounter::new();
        counter.tick();
        counter.tick();
        assert_eq!(counter.now_ms(), 2);

        counter.ms.store(u32::MAX, Ordering::Relaxed);
        counter.tick();
        assert_eq!(counter.now_ms(), 0);
    }
}
