//! Memory engine configuration
//!
//! Thresholds for retrieval, consolidation, decay and the maintenance
//! runner. Every struct deserializes with defaults so a partial TOML table
//! is enough.

use serde::{Deserialize, Serialize};

/// Upper bound for day-valued settings (about 100 years)
pub const MAX_DAYS: u32 = 36_500;

/// Upper bound for hour-valued settings (about 100 years)
pub const MAX_HOURS: u32 = MAX_DAYS * 24;

/// Memory engine configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Result cap for retrieve/search when the caller gives none (default: 10)
    pub default_limit: usize,

    /// Episodic → semantic promotion rules
    pub consolidation: ConsolidationPolicy,

    /// Weakening and forgetting rules
    pub decay: DecayPolicy,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            consolidation: ConsolidationPolicy::default(),
            decay: DecayPolicy::default(),
        }
    }
}

/// When an episodic memory is promoted to a semantic one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationPolicy {
    /// Importance must be strictly greater (default: 0.6)
    pub min_importance: f64,

    /// Access count must be strictly greater (default: 3)
    pub min_access_count: i64,

    /// Hours before a consolidated memory is eligible again (default: 24)
    pub cooldown_hours: u32,

    /// Multiplier applied to the new semantic memory's importance (default: 1.1)
    pub importance_boost: f64,
}

impl Default for ConsolidationPolicy {
    fn default() -> Self {
        Self {
            min_importance: 0.6,
            min_access_count: 3,
            cooldown_hours: 24,
            importance_boost: 1.1,
        }
    }
}

/// When a memory weakens and when it is forgotten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayPolicy {
    /// Only memories below this importance decay (default: 0.3)
    pub max_importance: f64,

    /// Only memories accessed fewer times decay (default: 5)
    pub max_access_count: i64,

    /// Importance multiplier per pass (default: 0.8)
    pub factor: f64,

    /// Memories weakened below this are deleted (default: 0.1)
    pub forget_below: f64,

    /// Minimum age in days when the caller gives none (default: 30)
    pub default_days_old: u32,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            max_importance: 0.3,
            max_access_count: 5,
            factor: 0.8,
            forget_below: 0.1,
            default_days_old: 30,
        }
    }
}

/// Periodic maintenance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Seconds between cycles (default: 3600)
    pub interval_secs: u64,

    /// Minimum memory age for decay during a cycle (default: 30)
    pub decay_days_old: u32,

    /// Run consolidation each cycle (default: true)
    pub consolidate: bool,

    /// Run decay each cycle (default: true)
    pub decay: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            decay_days_old: 30,
            consolidate: true,
            decay: true,
        }
    }
}

impl MemoryConfig {
    /// Set the default result cap
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the consolidation policy
    pub fn with_consolidation(mut self, policy: ConsolidationPolicy) -> Self {
        self.consolidation = policy;
        self
    }

    /// Set the decay policy
    pub fn with_decay(mut self, policy: DecayPolicy) -> Self {
        self.decay = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.default_limit == 0 {
            return Err(invalid("memory.default_limit", "must be greater than 0"));
        }

        let c = &self.consolidation;
        check_unit("memory.consolidation.min_importance", c.min_importance)?;
        if c.min_access_count < 0 {
            return Err(invalid("memory.consolidation.min_access_count", "must not be negative"));
        }
        if !(c.importance_boost >= 1.0) || !c.importance_boost.is_finite() {
            return Err(invalid("memory.consolidation.importance_boost", "must be a finite value >= 1"));
        }
        if c.cooldown_hours > MAX_HOURS {
            return Err(invalid("memory.consolidation.cooldown_hours", &format!("must be at most {MAX_HOURS}")));
        }

        let d = &self.decay;
        check_unit("memory.decay.max_importance", d.max_importance)?;
        check_unit("memory.decay.forget_below", d.forget_below)?;
        if !(d.factor > 0.0 && d.factor < 1.0) {
            return Err(invalid("memory.decay.factor", "must be between 0 and 1 (exclusive)"));
        }
        if d.max_access_count < 0 {
            return Err(invalid("memory.decay.max_access_count", "must not be negative"));
        }
        if d.default_days_old > MAX_DAYS {
            return Err(invalid("memory.decay.default_days_old", &format!("must be at most {MAX_DAYS}")));
        }

        Ok(())
    }
}

impl MaintenanceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.interval_secs == 0 {
            return Err(invalid("maintenance.interval_secs", "must be greater than 0"));
        }
        if self.decay_days_old > MAX_DAYS {
            return Err(invalid("maintenance.decay_days_old", &format!("must be at most {MAX_DAYS}")));
        }
        Ok(())
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be between 0 and 1"))
    }
}

fn invalid(field: &str, message: &str) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
