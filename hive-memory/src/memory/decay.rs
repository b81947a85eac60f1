//! Decay and forgetting.

use chrono::{DateTime, Utc};
use hive_core::db::memory as rows;
use rusqlite::Connection;
use tracing::debug;

use crate::config::DecayPolicy;
use crate::utils::days_before;

/// What one decay step does to a memory
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayOutcome {
    /// Importance lowered to the contained value
    Weakened(f64),
    /// Fell below the floor; delete it
    Forgotten,
}

/// Apply one decay step to an importance value.
pub fn decay_step(importance: f64, policy: &DecayPolicy) -> DecayOutcome {
    let weakened = importance * policy.factor;
    if weakened < policy.forget_below {
        DecayOutcome::Forgotten
    } else {
        DecayOutcome::Weakened(weakened)
    }
}

/// Run one pass for an agent. Returns how many memories were deleted;
/// weakened-but-kept memories are not counted.
pub(crate) fn decay(
    conn: &Connection,
    agent_id: &str,
    days_old: u32,
    policy: &DecayPolicy,
    as_of: DateTime<Utc>,
) -> hive_core::Result<usize> {
    let candidates = rows::decay_candidates(
        conn,
        agent_id,
        days_before(as_of, days_old),
        policy.max_importance,
        policy.max_access_count,
    )?;

    let mut forgotten = 0;
    for memory in &candidates {
        match decay_step(memory.importance, policy) {
            DecayOutcome::Weakened(importance) => rows::update_importance(conn, memory.id, importance)?,
            DecayOutcome::Forgotten => {
                if rows::delete_memory(conn, memory.id)? {
                    debug!(memory_id = memory.id, "Forgot memory");
                    forgotten += 1;
                }
            }
        }
    }

    Ok(forgotten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weakens_above_floor() {
        let policy = DecayPolicy::default();
        match decay_step(0.2, &policy) {
            DecayOutcome::Weakened(v) => assert!((v - 0.16).abs() < 1e-9),
            other => panic!("expected weakened, got {other:?}"),
        }
    }

    #[test]
    fn test_forgets_below_floor() {
        let policy = DecayPolicy::default();
        assert_eq!(decay_step(0.12, &policy), DecayOutcome::Forgotten);
        assert_eq!(decay_step(0.0, &policy), DecayOutcome::Forgotten);
    }

    #[test]
    fn test_exact_floor_is_kept() {
        let policy = DecayPolicy {
            factor: 0.5,
            forget_below: 0.1,
            ..Default::default()
        };
        assert_eq!(decay_step(0.2, &policy), DecayOutcome::Weakened(0.1));
    }

    #[test]
    fn test_repeated_steps_from_point_two() {
        // 0.2 → 0.16 → 0.128 → 0.1024 → forgotten
        let policy = DecayPolicy::default();
        let mut importance = 0.2;
        let mut kept = 0;
        while let DecayOutcome::Weakened(next) = decay_step(importance, &policy) {
            assert!(next < importance);
            importance = next;
            kept += 1;
        }
        assert_eq!(kept, 3);
    }
}
