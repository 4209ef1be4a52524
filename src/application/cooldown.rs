//! # Cooldown Gate
//!
//! Per-room ledger limiting keyword replies to one per cooldown window.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct CooldownGate {
    window: Duration,
    /// room ID -> time of the last granted response
    ledger: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CooldownGate {
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            window: Duration::seconds(cooldown_secs.min(u32::MAX as u64) as i64),
            ledger: Mutex::new(HashMap::new()),
        }
    }

    /// Grants a response if at least one window has passed since the last grant in
    /// `room_id` (rooms never granted before always pass). A grant records `now`;
    /// a denial leaves the ledger untouched.
    pub fn can_respond(&self, room_id: &str, now: DateTime<Utc>) -> bool {
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());

        let allowed = match ledger.get(room_id) {
            Some(last) => now.signed_duration_since(*last) >= self.window,
            None => true,
        };

        if allowed {
            ledger.insert(room_id.to_string(), now);
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_window_boundaries() {
        let gate = CooldownGate::new(60);
        assert!(gate.can_respond("!r:x", t(0)));
        assert!(!gate.can_respond("!r:x", t(59)));
        assert!(gate.can_respond("!r:x", t(60)));
    }

    #[test]
    fn test_denial_does_not_extend_window() {
        let gate = CooldownGate::new(10);
        assert!(gate.can_respond("!r:x", t(0)));
        for s in 1..10 {
            assert!(!gate.can_respond("!r:x", t(s)));
        }
        assert!(gate.can_respond("!r:x", t(10)));
    }

    #[test]
    fn test_rooms_are_independent() {
        let gate = CooldownGate::new(60);
        assert!(gate.can_respond("!a:x", t(0)));
        assert!(gate.can_respond("!b:x", t(1)));
        assert!(!gate.can_respond("!a:x", t(2)));
    }

    #[test]
    fn test_zero_cooldown_always_grants() {
        let gate = CooldownGate::new(0);
        assert!(gate.can_respond("!r:x", t(0)));
        assert!(gate.can_respond("!r:x", t(0)));
    }

    #[test]
    fn test_one_grant_per_window_under_concurrency() {
        let gate = std::sync::Arc::new(CooldownGate::new(60));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = gate.clone();
                std::thread::spawn(move || gate.can_respond("!r:x", t(5)))
            })
            .collect();
        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|g| *g)
            .count();
        assert_eq!(granted, 1);
    }
}
