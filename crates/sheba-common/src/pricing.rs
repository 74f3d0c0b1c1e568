/// Rule-based dynamic pricing.
///
/// A category base rate is adjusted by a fixed sequence of multiplicative factors (urgency,
/// complexity, location, time of day, weekend). Each applied factor is recorded as a
/// human-readable string in application order.
use chrono::{Datelike, Local, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::model::{Complexity, DemandLevel, Intent, PricingQuote, ServiceCategory, Urgency};

/// Base price (BDT) and complex-job multiplier per category.
fn base_rate(category: ServiceCategory) -> (f64, f64) {
    match category {
        ServiceCategory::AcRefrigeration => (800.0, 1.6),
        ServiceCategory::Plumbing => (600.0, 1.5),
        ServiceCategory::Electrical => (500.0, 1.4),
        ServiceCategory::HomeCleaning => (1200.0, 1.3),
        ServiceCategory::Tutoring => (700.0, 1.2),
        ServiceCategory::BeautyWellness => (900.0, 1.25),
        ServiceCategory::Painting => (2500.0, 1.8),
        ServiceCategory::General => (500.0, 1.3),
    }
}

/// Neighbourhood surcharges. Areas not listed are priced at the base rate.
const LOCATION_SURCHARGES: &[(&str, f64)] = &[
    ("Gulshan", 1.20),
    ("Banani", 1.15),
    ("Bashundhara", 1.10),
    ("Dhanmondi", 1.10),
    ("Uttara", 1.05),
    ("Motijheel", 1.05),
    ("Old Dhaka", 0.95),
];

const HIGH_DEMAND_AT: f64 = 1.4;

/// Multipliers turning the final price into the quoted range and the suggested price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub low: f64,
    pub optimal: f64,
    pub high: f64,
}

impl Default for PriceBand {
    fn default() -> Self {
        Self {
            low: 0.85,
            optimal: 0.95,
            high: 1.25,
        }
    }
}

impl PriceBand {
    /// Quotes are only well formed when `0 < low <= optimal <= high`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        positive("band.low", self.low)?;
        positive("band.optimal", self.optimal)?;
        positive("band.high", self.high)?;
        if self.low <= self.optimal && self.optimal <= self.high {
            Ok(())
        } else {
            Err(PipelineError::PriceBandOrder {
                low: self.low,
                optimal: self.optimal,
                high: self.high,
            })
        }
    }
}

/// Half-open range of hours `[start, end)` on a 24h clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }

    fn validate(&self, name: &str) -> Result<(), PipelineError> {
        if self.start < self.end && self.end <= 24 {
            Ok(())
        } else {
            Err(PipelineError::HourWindow {
                name: name.to_string(),
                start: self.start,
                end: self.end,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub band: PriceBand,
    pub urgency_high: f64,
    pub urgency_medium: f64,
    pub simple_job: f64,
    pub evening_peak: HourWindow,
    pub evening_surge: f64,
    pub business_hours: HourWindow,
    pub off_peak: f64,
    pub weekend: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            band: PriceBand::default(),
            urgency_high: 1.40,
            urgency_medium: 1.15,
            simple_job: 0.85,
            evening_peak: HourWindow { start: 17, end: 21 },
            evening_surge: 1.20,
            business_hours: HourWindow { start: 9, end: 17 },
            off_peak: 0.90,
            weekend: 1.15,
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.band.validate()?;
        positive("urgency_high", self.urgency_high)?;
        positive("urgency_medium", self.urgency_medium)?;
        positive("simple_job", self.simple_job)?;
        positive("evening_surge", self.evening_surge)?;
        positive("off_peak", self.off_peak)?;
        positive("weekend", self.weekend)?;
        self.evening_peak.validate("evening_peak")?;
        self.business_hours.validate("business_hours")?;
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), PipelineError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PipelineError::NonPositiveMultiplier {
            name: name.to_string(),
            value,
        })
    }
}

/// Signed percentage for a multiplier, e.g. 1.4 -> "+40%", 0.85 -> "-15%".
fn percent(multiplier: f64) -> String {
    let pct = ((multiplier - 1.0) * 100.0).round() as i64;
    if pct >= 0 {
        format!("+{pct}%")
    } else {
        format!("{pct}%")
    }
}

/// Running product of applied multipliers together with their descriptions.
struct Adjustments {
    product: f64,
    factors: Vec<String>,
}

impl Adjustments {
    fn new() -> Self {
        Self {
            product: 1.0,
            factors: Vec::new(),
        }
    }

    fn apply(&mut self, label: impl std::fmt::Display, multiplier: f64) {
        self.product *= multiplier;
        self.factors.push(format!("{label}: {}", percent(multiplier)));
    }
}

#[derive(Default)]
pub struct PricingEstimator {
    config: PricingConfig,
}

impl PricingEstimator {
    pub fn new(config: PricingConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Estimate using the host's local clock.
    pub fn estimate(&self, intent: &Intent) -> PricingQuote {
        self.estimate_at(intent, Local::now().naive_local())
    }

    /// Estimate as if the request were made at `at` (local time).
    pub fn estimate_at(&self, intent: &Intent, at: NaiveDateTime) -> PricingQuote {
        let cfg = &self.config;
        let (base, complex_multiplier) = base_rate(intent.service_category);
        let mut adjustments = Adjustments::new();
        // urgency × time of day × weekend, used to grade demand
        let mut market = 1.0;

        match intent.urgency {
            Urgency::High => {
                adjustments.apply("Urgent request", cfg.urgency_high);
                market *= cfg.urgency_high;
            }
            Urgency::Medium => {
                adjustments.apply("Priority request", cfg.urgency_medium);
                market *= cfg.urgency_medium;
            }
            Urgency::Low => {}
        }

        match intent.complexity {
            Complexity::Complex => adjustments.apply(
                format_args!("Complex {} job", intent.service_category),
                complex_multiplier,
            ),
            Complexity::Simple => adjustments.apply("Simple job", cfg.simple_job),
            Complexity::Moderate => {}
        }

        let area = intent.location.split(',').next().unwrap_or_default().trim();
        if let Some((name, surcharge)) = LOCATION_SURCHARGES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(area))
        {
            adjustments.apply(format_args!("{name} location"), *surcharge);
        }

        let hour = at.hour();
        if cfg.evening_peak.contains(hour) {
            adjustments.apply("Evening peak hours", cfg.evening_surge);
            market *= cfg.evening_surge;
        } else if !cfg.business_hours.contains(hour) {
            adjustments.apply("Off-peak hours", cfg.off_peak);
            market *= cfg.off_peak;
        }

        if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
            adjustments.apply("Weekend surcharge", cfg.weekend);
            market *= cfg.weekend;
        }

        let final_price = (base * adjustments.product).round();
        let band = cfg.band;
        let quote = PricingQuote {
            base_price: base as u32,
            final_price: final_price as u32,
            estimated_range_low: (final_price * band.low).round() as u32,
            estimated_range_high: (final_price * band.high).round() as u32,
            optimal_price: (final_price * band.optimal).round() as u32,
            factors_applied: adjustments.factors,
            demand_level: demand_level(market),
        };

        debug_assert!(
            quote.estimated_range_low <= quote.optimal_price
                && quote.optimal_price <= quote.estimated_range_high,
            "price band produced an unordered quote"
        );
        debug!(
            category = %intent.service_category,
            final_price = quote.final_price,
            factors = quote.factors_applied.len(),
            demand = ?quote.demand_level,
            "estimated price"
        );

        quote
    }
}

fn demand_level(market: f64) -> DemandLevel {
    if market >= HIGH_DEMAND_AT - 1e-9 {
        DemandLevel::High
    } else if market > 1.0 + 1e-9 {
        DemandLevel::Medium
    } else {
        DemandLevel::Low
    }
}
