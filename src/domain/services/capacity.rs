use crate::domain::models::registration::status;

/// Seat accounting for an event.
///
/// A registration holds a seat while it is ACCEPTED or PENDING: a pending
/// submission reserves its spot until a manager explicitly rejects it, so two
/// concurrent submissions cannot both be accepted into the last seat later.
/// REJECTED and WAITLIST registrations never count.
pub fn is_active_status(reg_status: &str) -> bool {
    reg_status == status::ACCEPTED || reg_status == status::PENDING
}

/// Remaining seats, floored at zero (manual admin edits can push the active
/// count past capacity).
pub fn available_spots(max_capacity: i32, active_count: i64) -> i64 {
    (max_capacity as i64 - active_count).max(0)
}

pub fn is_full(max_capacity: i32, active_count: i64) -> bool {
    active_count >= max_capacity as i64
}

/// Status a fresh submission receives: WAITLIST when the event is full at
/// submission time, PENDING otherwise.
pub fn initial_status(max_capacity: i32, active_count: i64) -> &'static str {
    if is_full(max_capacity, active_count) {
        status::WAITLIST
    } else {
        status::PENDING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spots_floor_at_zero() {
        assert_eq!(available_spots(2, 0), 2);
        assert_eq!(available_spots(2, 2), 0);
        // Over-subscription from manual edits must not go negative.
        assert_eq!(available_spots(2, 5), 0);
    }

    #[test]
    fn spots_plus_active_equals_capacity_before_clamp() {
        for (cap, active) in [(10, 0), (10, 3), (10, 10)] {
            assert_eq!(available_spots(cap, active) + active, cap as i64);
        }
    }

    #[test]
    fn full_event_waitlists_new_submissions() {
        assert_eq!(initial_status(2, 2), status::WAITLIST);
        assert_eq!(initial_status(2, 3), status::WAITLIST);
        assert_eq!(initial_status(2, 1), status::PENDING);
        assert_eq!(initial_status(0, 0), status::WAITLIST);
    }

    #[test]
    fn only_accepted_and_pending_hold_seats() {
        assert!(is_active_status(status::ACCEPTED));
        assert!(is_active_status(status::PENDING));
        assert!(!is_active_status(status::REJECTED));
        assert!(!is_active_status(status::WAITLIST));
    }
}
