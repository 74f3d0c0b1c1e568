/// Contextual service recommendations driven by weather, time of day and booking history.
use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime, Timelike};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

const MAX_RECOMMENDATIONS: usize = 5;
const MAX_HISTORY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Weather {
    pub temperature_c: f64,
    pub condition: WeatherCondition,
    /// Relative humidity, percent
    pub humidity: f64,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            temperature_c: 28.0,
            condition: WeatherCondition::Sunny,
            humidity: 65.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

/// Ambient conditions a recommendation round is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextSnapshot {
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub hour: u32,
    /// Lower-case short weekday, e.g. "sat"
    pub day_of_week: String,
}

impl ContextSnapshot {
    pub fn at(weather: Weather, at: NaiveDateTime) -> Self {
        Self {
            weather,
            time_of_day: TimeOfDay::from_hour(at.hour()),
            hour: at.hour(),
            day_of_week: at.format("%a").to_string().to_lowercase(),
        }
    }

    pub fn now(weather: Weather) -> Self {
        Self::at(weather, Local::now().naive_local())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    Location,
    Time,
    Behavior,
    Context,
    CrossDomain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    pub id: String,
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub actionable: bool,
    /// Service family the suggestion belongs to, e.g. "wellness"
    pub category: String,
}

impl Recommendation {
    fn new(
        id: &str,
        kind: RecommendationKind,
        title: &str,
        description: String,
        confidence: f64,
        category: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            description,
            confidence,
            actionable: true,
            category: category.to_string(),
        }
    }
}

/// What the user has booked recently and when they tend to be active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserBehavior {
    /// Most recent last, capped at 20 entries
    pub service_history: Vec<String>,
    /// Activity count per time of day, keyed by "morning", "afternoon", ...
    pub time_patterns: BTreeMap<String, u32>,
}

impl UserBehavior {
    pub fn record(&mut self, category: &str, time_of_day: TimeOfDay) {
        self.service_history.push(category.to_string());
        if self.service_history.len() > MAX_HISTORY {
            let excess = self.service_history.len() - MAX_HISTORY;
            self.service_history.drain(..excess);
        }
        *self
            .time_patterns
            .entry(time_of_day.as_str().to_string())
            .or_insert(0) += 1;
    }

    fn has_used(&self, category: &str) -> bool {
        self.service_history.iter().any(|c| c == category)
    }
}

/// Evaluate every rule and return the strongest suggestions, best first.
pub fn generate(context: &ContextSnapshot, behavior: &UserBehavior) -> Vec<Recommendation> {
    use RecommendationKind::*;

    let weather = &context.weather;
    let tod = context.time_of_day;
    let mut recs = Vec::new();

    if weather.temperature_c > 32.0 {
        recs.push(Recommendation::new(
            "loc-ac-repair",
            Location,
            "AC Repair Services Trending",
            format!(
                "AC repair services are trending nearby as temperature rose to {:.1}°C today.",
                weather.temperature_c
            ),
            0.85,
            "repair",
        ));
    }
    if tod == TimeOfDay::Morning {
        recs.push(Recommendation::new(
            "loc-coffee",
            Location,
            "Popular Morning Spots",
            "Users near you often visit CoffeeWave Café for morning productivity boosts."
                .to_string(),
            0.72,
            "food",
        ));
    }

    if tod == TimeOfDay::Afternoon && context.hour >= 16 {
        recs.push(Recommendation::new(
            "time-productivity",
            Time,
            "Productivity Break Time",
            "Users often book productivity breaks at 4 PM. Want to schedule one?".to_string(),
            0.68,
            "wellness",
        ));
    }
    if tod == TimeOfDay::Evening {
        recs.push(Recommendation::new(
            "time-yoga",
            Time,
            "Evening Relaxation",
            "People in your area book stress-relief yoga sessions after 8 PM.".to_string(),
            0.75,
            "wellness",
        ));
    }

    if behavior.has_used("cleaning") {
        recs.push(Recommendation::new(
            "behavior-deep-clean",
            Behavior,
            "Deep Cleaning Suggestion",
            "Based on your cleaning history, users like you often book deep cleaning monthly."
                .to_string(),
            0.78,
            "cleaning",
        ));
    }

    if weather.condition == WeatherCondition::Rainy && tod == TimeOfDay::Evening {
        recs.push(Recommendation::new(
            "context-home-spa",
            Context,
            "Rainy Evening Relaxation",
            "Since it's raining, users nearby are booking home spa services for cozy evenings."
                .to_string(),
            0.82,
            "wellness",
        ));
    }

    if weather.temperature_c > 30.0 && tod == TimeOfDay::Afternoon && behavior.has_used("wellness")
    {
        recs.push(Recommendation::new(
            "cross-cooling-wellness",
            CrossDomain,
            "Beat the Heat Wellness",
            "Hot afternoon + your wellness interest = cooling massage therapy trending nearby."
                .to_string(),
            0.88,
            "wellness",
        ));
    }

    recs.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

/// Per-user recommendation state: the latest context, behaviour and current suggestions.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    context: ContextSnapshot,
    behavior: UserBehavior,
    current: Vec<Recommendation>,
}

impl RecommendationEngine {
    pub fn new(context: ContextSnapshot) -> Self {
        let behavior = UserBehavior::default();
        let current = generate(&context, &behavior);
        Self {
            context,
            behavior,
            current,
        }
    }

    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }

    pub fn behavior(&self) -> &UserBehavior {
        &self.behavior
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.current
    }

    /// Replace the context and regenerate.
    pub fn refresh(&mut self, context: ContextSnapshot) -> &[Recommendation] {
        self.context = context;
        self.regenerate()
    }

    pub fn regenerate(&mut self) -> &[Recommendation] {
        self.current = generate(&self.context, &self.behavior);
        &self.current
    }

    /// Record that the user engaged with `category`, then regenerate.
    pub fn record_usage(&mut self, category: &str) -> &[Recommendation] {
        self.behavior.record(category, self.context.time_of_day);
        info!(
            category,
            history = self.behavior.service_history.len(),
            "recorded service usage"
        );
        self.regenerate()
    }

    /// Returns whether a recommendation with `id` was present.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.current.len();
        self.current.retain(|r| r.id != id);
        self.current.len() != before
    }

    /// Record the recommendation's category as used and drop it from the current list.
    pub fn accept(&mut self, id: &str) -> Option<Recommendation> {
        let accepted = self.current.iter().find(|r| r.id == id).cloned()?;
        self.record_usage(&accepted.category);
        self.dismiss(id);
        Some(accepted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at_hour(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 5)
            .and_then(|d| d.and_hms_opt(hour, 30, 0))
            .expect("valid date")
    }

    fn weather(temperature_c: f64, condition: WeatherCondition) -> Weather {
        Weather {
            temperature_c,
            condition,
            humidity: 70.0,
        }
    }

    fn ids(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
    }

    #[test]
    fn snapshot_records_weekday() {
        let ctx = ContextSnapshot::at(Weather::default(), at_hour(9));
        assert_eq!(ctx.day_of_week, "wed");
        assert_eq!(ctx.time_of_day, TimeOfDay::Morning);
    }

    #[test]
    fn hot_morning_suggests_ac_and_coffee() {
        let ctx = ContextSnapshot::at(weather(34.2, WeatherCondition::Sunny), at_hour(9));
        let recs = generate(&ctx, &UserBehavior::default());
        assert_eq!(ids(&recs), vec!["loc-ac-repair", "loc-coffee"]);
        assert!(recs[0].description.contains("34.2°C"));
    }

    #[test]
    fn rainy_evening_with_cleaning_history() {
        let ctx = ContextSnapshot::at(weather(26.0, WeatherCondition::Rainy), at_hour(19));
        let mut behavior = UserBehavior::default();
        behavior.record("cleaning", TimeOfDay::Evening);

        let recs = generate(&ctx, &behavior);
        assert_eq!(
            ids(&recs),
            vec!["context-home-spa", "behavior-deep-clean", "time-yoga"]
        );
    }

    #[test]
    fn hot_afternoon_cross_domain_needs_wellness_history() {
        let ctx = ContextSnapshot::at(weather(31.0, WeatherCondition::Sunny), at_hour(16));
        let recs = generate(&ctx, &UserBehavior::default());
        assert_eq!(ids(&recs), vec!["time-productivity"]);

        let mut behavior = UserBehavior::default();
        behavior.record("wellness", TimeOfDay::Afternoon);
        let recs = generate(&ctx, &behavior);
        assert_eq!(ids(&recs), vec!["cross-cooling-wellness", "time-productivity"]);
    }

    #[test]
    fn results_are_sorted_and_capped() {
        let ctx = ContextSnapshot::at(weather(35.0, WeatherCondition::Rainy), at_hour(18));
        let mut behavior = UserBehavior::default();
        behavior.record("cleaning", TimeOfDay::Evening);
        behavior.record("wellness", TimeOfDay::Evening);

        let recs = generate(&ctx, &behavior);
        assert!(recs.len() <= MAX_RECOMMENDATIONS);
        for pair in recs.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn history_keeps_last_twenty() {
        let mut behavior = UserBehavior::default();
        for i in 0..25 {
            behavior.record(&format!("svc-{i}"), TimeOfDay::Night);
        }
        assert_eq!(behavior.service_history.len(), 20);
        assert_eq!(behavior.service_history[0], "svc-5");
        assert_eq!(behavior.service_history[19], "svc-24");
        assert_eq!(behavior.time_patterns.get("night"), Some(&25));
    }

    #[test]
    fn engine_dismiss_and_accept() {
        let ctx = ContextSnapshot::at(weather(33.0, WeatherCondition::Rainy), at_hour(19));
        let mut engine = RecommendationEngine::new(ctx);
        assert_eq!(
            ids(engine.recommendations()),
            vec!["loc-ac-repair", "context-home-spa", "time-yoga"]
        );

        assert!(engine.dismiss("time-yoga"));
        assert!(!engine.dismiss("time-yoga"));

        let accepted = engine.accept("context-home-spa").expect("present");
        assert_eq!(accepted.category, "wellness");
        assert_eq!(engine.behavior().service_history, vec!["wellness".to_string()]);
        assert!(!ids(engine.recommendations()).contains(&"context-home-spa"));
        assert!(engine.accept("missing").is_none());
    }

    #[test]
    fn recording_cleaning_unlocks_deep_clean() {
        let ctx = ContextSnapshot::at(Weather::default(), at_hour(23));
        let mut engine = RecommendationEngine::new(ctx);
        assert!(engine.recommendations().is_empty());

        let recs = engine.record_usage("cleaning");
        assert_eq!(ids(recs), vec!["behavior-deep-clean"]);
    }
}
