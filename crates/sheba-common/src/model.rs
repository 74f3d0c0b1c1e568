use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A bookable service line on the marketplace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    AcRefrigeration,
    Plumbing,
    Electrical,
    HomeCleaning,
    Tutoring,
    BeautyWellness,
    Painting,
    /// Catch-all used when no keyword rule matched.
    General,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 8] = [
        ServiceCategory::AcRefrigeration,
        ServiceCategory::Plumbing,
        ServiceCategory::Electrical,
        ServiceCategory::HomeCleaning,
        ServiceCategory::Tutoring,
        ServiceCategory::BeautyWellness,
        ServiceCategory::Painting,
        ServiceCategory::General,
    ];

    /// Display name shown to customers, e.g. "AC & Refrigeration".
    pub fn label(&self) -> &'static str {
        match self {
            Self::AcRefrigeration => "AC & Refrigeration",
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::HomeCleaning => "Home Cleaning",
            Self::Tutoring => "Tutoring",
            Self::BeautyWellness => "Beauty & Wellness",
            Self::Painting => "Painting",
            Self::General => "General",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

/// Structured interpretation of a free-text service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Intent {
    pub service_category: ServiceCategory,
    pub urgency: Urgency,
    /// Neighbourhood, e.g. "Mirpur, Dhaka"
    pub location: String,
    pub complexity: Complexity,
    /// Fixed per-category value from the confidence table, in [0, 1]
    pub confidence: f64,
    /// Keyword that selected the category; `None` when the fallback was used
    pub matched_keyword: Option<String>,
}

impl Intent {
    /// True when no category rule matched and `General` was assigned as a default.
    pub fn is_fallback(&self) -> bool {
        self.matched_keyword.is_none()
    }
}

/// How soon a provider can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Availability {
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hour")]
    OneHour,
}

impl Availability {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::ThirtyMinutes => "within 30 min",
            Self::OneHour => "within 1 hour",
        }
    }
}

/// Price range quoted by a provider, in BDT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

/// A catalog entry for a service professional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderCandidate {
    pub id: String,
    pub name: String,
    /// Average review rating out of 5
    pub rating: f64,
    /// 0-100 reliability proxy
    pub trust_score: u8,
    pub distance_km: f64,
    pub response_time_min: u32,
    /// Percentage of accepted jobs completed, 0-100
    pub completion_rate: f64,
    pub specialties: BTreeSet<ServiceCategory>,
    pub price_range: PriceRange,
    pub availability: Availability,
    /// Estimated probability of a fraudulent booking, 0-1
    pub fraud_risk: f64,
}

/// Individual sub-scores that make up a provider's ranking score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreBreakdown {
    pub specialty: f64,
    pub distance: f64,
    pub trust_rating: f64,
    pub availability: f64,
    pub reliability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedProvider {
    pub provider: ProviderCandidate,
    pub ml_score: f64,
    pub breakdown: ScoreBreakdown,
    /// Human-readable reasons this provider was recommended
    pub why_recommended: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

/// Dynamic price estimate for an intent, in BDT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PricingQuote {
    pub base_price: u32,
    pub final_price: u32,
    pub estimated_range_low: u32,
    pub estimated_range_high: u32,
    pub optimal_price: u32,
    /// Adjustments in the order they were applied, e.g. "Urgent request: +40%"
    pub factors_applied: Vec<String>,
    pub demand_level: DemandLevel,
}
