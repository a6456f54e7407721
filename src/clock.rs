//! Countdown clock for a session.
//!
//! The clock owns no thread or timer. Whoever runs the event loop feeds it
//! elapsed wall time through [`SessionClock::advance`], and it turns that into
//! whole-second ticks and a single expiry.
//!
//! ```text
//! Idle -> Running -> Expired
//!   \________\________\____> Cancelled
//! ```

use std::time::Duration;

const ONE_SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Tick { remaining_secs: u64 },
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
    duration_secs: u64,
    remaining_secs: u64,
    /// Elapsed time not yet converted into a whole-second tick
    carry: Duration,
}

impl SessionClock {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            state: ClockState::Idle,
            duration_secs,
            remaining_secs: duration_secs,
            carry: Duration::ZERO,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Seconds elapsed since start, including the partial second in flight
    pub fn elapsed_secs(&self) -> f64 {
        (self.duration_secs - self.remaining_secs) as f64 + self.carry.as_secs_f64()
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Idle -> Running. Emits the initial tick; a no-op from any other state.
    pub fn start(&mut self) -> Option<ClockEvent> {
        if self.state != ClockState::Idle {
            return None;
        }
        self.state = ClockState::Running;
        Some(ClockEvent::Tick {
            remaining_secs: self.remaining_secs,
        })
    }

    /// Feed elapsed wall time. Returns one tick per whole second crossed,
    /// followed by `Expired` when the countdown reaches zero.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if self.state != ClockState::Running {
            return events;
        }

        self.carry += elapsed;
        while self.carry >= ONE_SECOND {
            self.carry -= ONE_SECOND;
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
            events.push(ClockEvent::Tick {
                remaining_secs: self.remaining_secs,
            });

            if self.remaining_secs == 0 {
                self.state = ClockState::Expired;
                self.carry = Duration::ZERO;
                events.push(ClockEvent::Expired);
                break;
            }
        }
        events
    }

    pub fn tick(&mut self) -> Vec<ClockEvent> {
        self.advance(ONE_SECOND)
    }

    /// Stop for good. Nothing is emitted after this, whatever the state was.
    pub fn cancel(&mut self) {
        if self.state != ClockState::Expired {
            self.state = ClockState::Cancelled;
        }
        self.carry = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_emits_full_remaining() {
        let mut clock = SessionClock::new(30);
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(
            clock.start(),
            Some(ClockEvent::Tick { remaining_secs: 30 })
        );
        assert!(clock.is_running());
        assert_eq!(clock.start(), None);
    }

    #[test]
    fn test_idle_clock_ignores_time() {
        let mut clock = SessionClock::new(3);
        assert!(clock.advance(Duration::from_secs(10)).is_empty());
        assert_eq!(clock.remaining_secs(), 3);
    }

    #[test]
    fn test_counts_down_to_single_expiry() {
        let mut clock = SessionClock::new(3);
        clock.start();

        assert_eq!(clock.tick(), vec![ClockEvent::Tick { remaining_secs: 2 }]);
        assert_eq!(clock.tick(), vec![ClockEvent::Tick { remaining_secs: 1 }]);
        assert_eq!(
            clock.tick(),
            vec![ClockEvent::Tick { remaining_secs: 0 }, ClockEvent::Expired]
        );
        assert_eq!(clock.state(), ClockState::Expired);

        assert!(clock.tick().is_empty());
        assert!(clock.advance(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_sub_second_time_accumulates() {
        let mut clock = SessionClock::new(5);
        clock.start();

        for _ in 0..9 {
            assert!(clock.advance(Duration::from_millis(100)).is_empty());
        }
        assert_eq!(
            clock.advance(Duration::from_millis(100)),
            vec![ClockEvent::Tick { remaining_secs: 4 }]
        );
        assert!((clock.elapsed_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_jump_stops_at_expiry() {
        let mut clock = SessionClock::new(2);
        clock.start();
        let events = clock.advance(Duration::from_secs(10));
        assert_eq!(
            events,
            vec![
                ClockEvent::Tick { remaining_secs: 1 },
                ClockEvent::Tick { remaining_secs: 0 },
                ClockEvent::Expired
            ]
        );
        assert_eq!(events.iter().filter(|e| **e == ClockEvent::Expired).count(), 1);
    }

    #[test]
    fn test_cancel_silences_running_clock() {
        let mut clock = SessionClock::new(2);
        clock.start();
        clock.advance(Duration::from_millis(900));
        clock.cancel();
        assert_eq!(clock.state(), ClockState::Cancelled);
        assert!(clock.advance(Duration::from_secs(5)).is_empty());
        assert_eq!(clock.start(), None);
    }

    #[test]
    fn test_cancel_from_idle_and_expired() {
        let mut idle = SessionClock::new(2);
        idle.cancel();
        assert_eq!(idle.start(), None);

        let mut expired = SessionClock::new(1);
        expired.start();
        expired.tick();
        expired.cancel();
        assert_eq!(expired.state(), ClockState::Expired);
        assert!(expired.tick().is_empty());
    }
}
