//! Subscription tier catalog: tiers, their limit/feature bundles, and
//! the static comparison table shown on the billing page.
//!
//! Tier definitions are process-wide constants. All lookups here are
//! side-effect free; the catalog never changes at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Feature identifiers
// ---------------------------------------------------------------------------

/// Basic point-and-click automation.
pub const FEATURE_BASIC_AUTOMATION: &str = "basic_automation";
/// Multi-step automation with conditions and retries.
pub const FEATURE_ADVANCED_AUTOMATION: &str = "advanced_automation";
/// Cron-style task scheduling.
pub const FEATURE_TASK_SCHEDULING: &str = "task_scheduling";
/// User-defined workflow graphs.
pub const FEATURE_CUSTOM_WORKFLOWS: &str = "custom_workflows";
/// Shared workspaces and task hand-off.
pub const FEATURE_TEAM_COLLABORATION: &str = "team_collaboration";
/// Single sign-on integration.
pub const FEATURE_SSO: &str = "sso";
/// Audit log access.
pub const FEATURE_AUDIT_LOGS: &str = "audit_logs";

// ---------------------------------------------------------------------------
// AI provider identifiers
// ---------------------------------------------------------------------------

pub const AI_PROVIDER_OPENAI: &str = "openai";
pub const AI_PROVIDER_ANTHROPIC: &str = "anthropic";
pub const AI_PROVIDER_AZURE_OPENAI: &str = "azure_openai";
pub const AI_PROVIDER_BEDROCK: &str = "bedrock";

// ---------------------------------------------------------------------------
// Limit
// ---------------------------------------------------------------------------

/// A per-tier numeric cap.
///
/// The backing store encodes "no cap" as `-1`. [`Limit`] replaces that
/// sentinel with an explicit alternative so an unbounded cap can never
/// be compared as an ordinary integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Limit {
    /// At most this many.
    Limited(u32),
    /// No upper bound applies.
    Unlimited,
}

impl Limit {
    pub fn is_unlimited(self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// Whether one more unit fits under the cap given current usage.
    pub fn allows(self, used: u32) -> bool {
        match self {
            Limit::Limited(cap) => used < cap,
            Limit::Unlimited => true,
        }
    }

    /// How many units remain under the cap. Never negative.
    pub fn remaining_after(self, used: u32) -> Limit {
        match self {
            Limit::Limited(cap) => Limit::Limited(cap.saturating_sub(used)),
            Limit::Unlimited => Limit::Unlimited,
        }
    }
}

impl TryFrom<i64> for Limit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Limit::Unlimited),
            n if n >= 0 && n <= i64::from(u32::MAX) => Ok(Limit::Limited(n as u32)),
            other => Err(format!("invalid limit value: {other}")),
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Limited(cap) => i64::from(cap),
            Limit::Unlimited => -1,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Limited(cap) => write!(f, "{cap}"),
            Limit::Unlimited => write!(f, "unlimited"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Subscription tier, ordered lowest to highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Unlimited,
    Business,
    Enterprise,
}

/// All tiers in ascending order.
pub const ALL_TIERS: [Tier; 5] = [
    Tier::Free,
    Tier::Pro,
    Tier::Unlimited,
    Tier::Business,
    Tier::Enterprise,
];

impl Tier {
    /// The wire identifier used by the backing store.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Unlimited => "unlimited",
            Tier::Business => "business",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Human-readable name for display.
    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Pro => "Pro",
            Tier::Unlimited => "Unlimited",
            Tier::Business => "Business",
            Tier::Enterprise => "Enterprise",
        }
    }

    /// Parse a wire identifier into a tier.
    ///
    /// Fails with [`CoreError::UnknownTier`] for anything outside the
    /// enumeration.
    pub fn parse(name: &str) -> Result<Tier, CoreError> {
        match name {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "unlimited" => Ok(Tier::Unlimited),
            "business" => Ok(Tier::Business),
            "enterprise" => Ok(Tier::Enterprise),
            other => Err(CoreError::UnknownTier(other.to_string())),
        }
    }

    /// The limit/feature bundle for this tier.
    pub fn limits(self) -> &'static TierLimits {
        match self {
            Tier::Free => &FREE_LIMITS,
            Tier::Pro => &PRO_LIMITS,
            Tier::Unlimited => &UNLIMITED_LIMITS,
            Tier::Business => &BUSINESS_LIMITS,
            Tier::Enterprise => &ENTERPRISE_LIMITS,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TierLimits
// ---------------------------------------------------------------------------

/// The limit/feature bundle attached to a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    /// Tasks that may be started per day.
    pub tasks_per_day: Limit,
    /// Whether tasks may keep running while the app is in the background.
    pub background_mode: bool,
    /// AI providers available to this tier.
    pub ai_providers: &'static [&'static str],
    /// Tasks that may run at the same time.
    pub max_concurrent_tasks: Limit,
    /// Days of task history retained.
    pub task_history_days: Limit,
    /// Feature identifiers enabled for this tier.
    pub features: &'static [&'static str],
}

const FREE_LIMITS: TierLimits = TierLimits {
    tasks_per_day: Limit::Limited(5),
    background_mode: false,
    ai_providers: &[AI_PROVIDER_OPENAI],
    max_concurrent_tasks: Limit::Limited(1),
    task_history_days: Limit::Limited(7),
    features: &[FEATURE_BASIC_AUTOMATION],
};

const PRO_LIMITS: TierLimits = TierLimits {
    tasks_per_day: Limit::Limited(50),
    background_mode: true,
    ai_providers: &[AI_PROVIDER_OPENAI, AI_PROVIDER_ANTHROPIC],
    max_concurrent_tasks: Limit::Limited(3),
    task_history_days: Limit::Limited(30),
    features: &[
        FEATURE_BASIC_AUTOMATION,
        FEATURE_ADVANCED_AUTOMATION,
        FEATURE_TASK_SCHEDULING,
    ],
};

const UNLIMITED_LIMITS: TierLimits = TierLimits {
    tasks_per_day: Limit::Unlimited,
    background_mode: true,
    ai_providers: &[
        AI_PROVIDER_OPENAI,
        AI_PROVIDER_ANTHROPIC,
        AI_PROVIDER_AZURE_OPENAI,
    ],
    max_concurrent_tasks: Limit::Limited(5),
    task_history_days: Limit::Limited(90),
    features: &[
        FEATURE_BASIC_AUTOMATION,
        FEATURE_ADVANCED_AUTOMATION,
        FEATURE_TASK_SCHEDULING,
        FEATURE_CUSTOM_WORKFLOWS,
    ],
};

const BUSINESS_LIMITS: TierLimits = TierLimits {
    tasks_per_day: Limit::Unlimited,
    background_mode: true,
    ai_providers: &[
        AI_PROVIDER_OPENAI,
        AI_PROVIDER_ANTHROPIC,
        AI_PROVIDER_AZURE_OPENAI,
        AI_PROVIDER_BEDROCK,
    ],
    max_concurrent_tasks: Limit::Limited(10),
    task_history_days: Limit::Limited(365),
    features: &[
        FEATURE_BASIC_AUTOMATION,
        FEATURE_ADVANCED_AUTOMATION,
        FEATURE_TASK_SCHEDULING,
        FEATURE_CUSTOM_WORKFLOWS,
        FEATURE_TEAM_COLLABORATION,
    ],
};

const ENTERPRISE_LIMITS: TierLimits = TierLimits {
    tasks_per_day: Limit::Unlimited,
    background_mode: true,
    ai_providers: &[
        AI_PROVIDER_OPENAI,
        AI_PROVIDER_ANTHROPIC,
        AI_PROVIDER_AZURE_OPENAI,
        AI_PROVIDER_BEDROCK,
    ],
    max_concurrent_tasks: Limit::Unlimited,
    task_history_days: Limit::Unlimited,
    features: &[
        FEATURE_BASIC_AUTOMATION,
        FEATURE_ADVANCED_AUTOMATION,
        FEATURE_TASK_SCHEDULING,
        FEATURE_CUSTOM_WORKFLOWS,
        FEATURE_TEAM_COLLABORATION,
        FEATURE_SSO,
        FEATURE_AUDIT_LOGS,
    ],
};

// ---------------------------------------------------------------------------
// Catalog lookups
// ---------------------------------------------------------------------------

/// Look up a tier and its limits by wire identifier.
///
/// Fails with [`CoreError::UnknownTier`] for identifiers outside the
/// enumeration.
pub fn limits_for(name: &str) -> Result<(Tier, &'static TierLimits), CoreError> {
    let tier = Tier::parse(name)?;
    Ok((tier, tier.limits()))
}

/// All tiers with their limits, in ascending order.
pub fn all_tiers() -> Vec<(Tier, &'static TierLimits)> {
    ALL_TIERS.iter().map(|&tier| (tier, tier.limits())).collect()
}

// ---------------------------------------------------------------------------
// Comparison table
// ---------------------------------------------------------------------------

/// Display-oriented tier descriptor for the billing page.
#[derive(Debug, Clone, Serialize)]
pub struct TierDescriptor {
    pub tier: Tier,
    pub name: &'static str,
    pub price: &'static str,
    pub period: &'static str,
    pub features: &'static [&'static str],
    pub limitations: &'static [&'static str],
    pub popular: bool,
}

/// Tier comparison data for the billing page, ascending tier order.
pub fn tier_comparison() -> &'static [TierDescriptor] {
    &COMPARISON_TABLE
}

static COMPARISON_TABLE: [TierDescriptor; 5] = [
    TierDescriptor {
        tier: Tier::Free,
        name: "Free",
        price: "$0",
        period: "forever",
        features: &[
            "5 tasks per day",
            "Basic automation",
            "OpenAI integration",
            "1 concurrent task",
            "7 days history",
        ],
        limitations: &[
            "No background mode",
            "Limited AI providers",
            "Basic features only",
        ],
        popular: false,
    },
    TierDescriptor {
        tier: Tier::Pro,
        name: "Pro",
        price: "$19",
        period: "per month",
        features: &[
            "50 tasks per day",
            "Background mode",
            "Advanced automation",
            "Task scheduling",
            "OpenAI + Anthropic",
            "3 concurrent tasks",
            "30 days history",
        ],
        limitations: &[],
        popular: true,
    },
    TierDescriptor {
        tier: Tier::Unlimited,
        name: "Unlimited",
        price: "$49",
        period: "per month",
        features: &[
            "Unlimited tasks",
            "All Pro features",
            "Custom workflows",
            "Azure OpenAI support",
            "5 concurrent tasks",
            "90 days history",
        ],
        limitations: &[],
        popular: false,
    },
    TierDescriptor {
        tier: Tier::Business,
        name: "Business",
        price: "$99",
        period: "per month",
        features: &[
            "Everything in Unlimited",
            "Team collaboration",
            "All AI providers",
            "10 concurrent tasks",
            "1 year history",
            "Priority support",
        ],
        limitations: &[],
        popular: false,
    },
    TierDescriptor {
        tier: Tier::Enterprise,
        name: "Enterprise",
        price: "Custom",
        period: "contact us",
        features: &[
            "Everything in Business",
            "SSO integration",
            "Audit logs",
            "Unlimited concurrent tasks",
            "Unlimited history",
            "Dedicated support",
            "Custom integrations",
        ],
        limitations: &[],
        popular: false,
    },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
