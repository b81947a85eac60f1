//! Importance scoring.
//!
//! A memory stored without an explicit importance is scored from its tier,
//! its category and how much it says:
//!
//! ```text
//! importance = min(0.5 × type × category × min(chars / 100, 2.0), 1.0)
//! ```

use hive_core::types::{MemoryCategory, MemoryType};

const BASE_SCORE: f64 = 0.5;
const LENGTH_UNIT: f64 = 100.0;
const MAX_LENGTH_FACTOR: f64 = 2.0;

fn type_factor(memory_type: MemoryType) -> f64 {
    match memory_type {
        MemoryType::Working => 0.7,
        MemoryType::Episodic => 1.0,
        MemoryType::Semantic => 1.2,
    }
}

fn category_factor(category: MemoryCategory) -> f64 {
    match category {
        MemoryCategory::Solution => 1.3,
        MemoryCategory::Pattern => 1.2,
        MemoryCategory::Knowledge => 1.1,
        MemoryCategory::Conversation | MemoryCategory::Task | MemoryCategory::Context => 1.0,
    }
}

/// Length counts characters, not bytes.
fn length_factor(content: &str) -> f64 {
    (content.chars().count() as f64 / LENGTH_UNIT).min(MAX_LENGTH_FACTOR)
}

/// Score a memory's importance in `[0, 1]`.
pub fn score_importance(memory_type: MemoryType, category: MemoryCategory, content: &str) -> f64 {
    let score = BASE_SCORE * type_factor(memory_type) * category_factor(category) * length_factor(content);
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_baseline_episodic_task() {
        let content = "x".repeat(100);
        assert!(approx(score_importance(MemoryType::Episodic, MemoryCategory::Task, &content), 0.5));
    }

    #[test]
    fn test_working_context_hundred_chars() {
        let content = "y".repeat(100);
        assert!(approx(score_importance(MemoryType::Working, MemoryCategory::Context, &content), 0.35));
    }

    #[test]
    fn test_semantic_solution_caps_at_one() {
        let content = "z".repeat(200);
        assert_eq!(score_importance(MemoryType::Semantic, MemoryCategory::Solution, &content), 1.0);
    }

    #[test]
    fn test_short_content_scores_low() {
        let score = score_importance(MemoryType::Episodic, MemoryCategory::Conversation, "0123456789");
        assert!(approx(score, 0.05));
    }

    #[test]
    fn test_empty_content_scores_zero() {
        assert_eq!(score_importance(MemoryType::Semantic, MemoryCategory::Solution, ""), 0.0);
    }

    #[test]
    fn test_category_ordering() {
        let content = "w".repeat(100);
        let s = |c| score_importance(MemoryType::Episodic, c, &content);
        assert!(s(MemoryCategory::Solution) > s(MemoryCategory::Pattern));
        assert!(s(MemoryCategory::Pattern) > s(MemoryCategory::Knowledge));
        assert!(s(MemoryCategory::Knowledge) > s(MemoryCategory::Task));
    }

    #[test]
    fn test_length_counts_chars() {
        // 50 two-byte chars
        let content = "é".repeat(50);
        assert!(approx(score_importance(MemoryType::Episodic, MemoryCategory::Task, &content), 0.25));
    }

    fn any_type() -> impl Strategy<Value = MemoryType> {
        prop::sample::select(MemoryType::ALL.to_vec())
    }

    fn any_category() -> impl Strategy<Value = MemoryCategory> {
        prop::sample::select(MemoryCategory::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_score_in_unit_interval(t in any_type(), c in any_category(), content in ".{0,400}") {
            let score = score_importance(t, c, &content);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn prop_score_monotone_in_length(t in any_type(), c in any_category(), a in 0usize..400, b in 0usize..400) {
            let (short, long) = if a <= b { (a, b) } else { (b, a) };
            let s_short = score_importance(t, c, &"a".repeat(short));
            let s_long = score_importance(t, c, &"a".repeat(long));
            prop_assert!(s_short <= s_long);
        }

        #[test]
        fn prop_score_constant_beyond_two_hundred(t in any_type(), c in any_category(), extra in 0usize..300) {
            let at_cap = score_importance(t, c, &"a".repeat(200));
            let beyond = score_importance(t, c, &"a".repeat(200 + extra));
            prop_assert_eq!(at_cap, beyond);
        }
    }
}
