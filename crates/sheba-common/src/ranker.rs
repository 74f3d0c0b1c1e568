/// Weighted linear ranking of providers against a classified intent.
use tracing::debug;

use crate::model::{
    Availability, Intent, ProviderCandidate, RankedProvider, ScoreBreakdown, ServiceCategory,
    Urgency,
};

const SPECIALTY_WEIGHT: f64 = 0.30;
const DISTANCE_WEIGHT: f64 = 0.20;
const TRUST_WEIGHT: f64 = 0.15;
const RATING_WEIGHT: f64 = 0.10;
const AVAILABILITY_WEIGHT: f64 = 0.15;
const RELIABILITY_WEIGHT: f64 = 0.10;

/// Distance at which the distance sub-score reaches zero.
const DISTANCE_HORIZON_KM: f64 = 10.0;

const HIGH_COMPLETION_RATE: f64 = 98.0;
const HIGH_TRUST_SCORE: u8 = 95;
const NEARBY_KM: f64 = 2.0;
const LOW_FRAUD_RISK: f64 = 0.02;
const TOP_RATING: f64 = 4.8;
const FAST_RESPONSE_MIN: u32 = 15;

/// Rank `candidates` for `intent`, best first, returning at most `top_n` entries.
///
/// Only specialists in the intent's category are considered unless the category is
/// `General`, in which case every candidate is scored.
pub fn rank(intent: &Intent, candidates: &[ProviderCandidate], top_n: usize) -> Vec<RankedProvider> {
    let category = intent.service_category;

    let mut ranked: Vec<RankedProvider> = candidates
        .iter()
        .filter(|p| category == ServiceCategory::General || p.specialties.contains(&category))
        .map(|p| score(intent, p))
        .collect();

    // sort_by is stable, so equal scores keep catalog order
    ranked.sort_by(|a, b| b.ml_score.total_cmp(&a.ml_score));
    ranked.truncate(top_n);

    debug!(
        category = %category,
        considered = candidates.len(),
        returned = ranked.len(),
        top = ranked.first().map(|r| r.provider.name.as_str()).unwrap_or("-"),
        "ranked providers"
    );

    ranked
}

fn score(intent: &Intent, provider: &ProviderCandidate) -> RankedProvider {
    let exact_match = provider.specialties.contains(&intent.service_category);

    let breakdown = ScoreBreakdown {
        specialty: if exact_match { 1.0 } else { 0.3 },
        distance: (1.0 - provider.distance_km / DISTANCE_HORIZON_KM).max(0.0),
        trust_rating: (provider.trust_score as f64 / 100.0) * TRUST_WEIGHT
            + (provider.rating / 5.0) * RATING_WEIGHT,
        availability: availability_alignment(intent.urgency, provider.availability),
        reliability: (provider.completion_rate / 100.0) * (1.0 - provider.fraud_risk),
    };

    let ml_score = breakdown.specialty * SPECIALTY_WEIGHT
        + breakdown.distance * DISTANCE_WEIGHT
        + breakdown.trust_rating
        + breakdown.availability * AVAILABILITY_WEIGHT
        + breakdown.reliability * RELIABILITY_WEIGHT;

    RankedProvider {
        provider: provider.clone(),
        ml_score,
        breakdown,
        why_recommended: explain(intent, provider, exact_match),
    }
}

fn availability_alignment(urgency: Urgency, availability: Availability) -> f64 {
    match (urgency, availability) {
        (Urgency::High, Availability::Now) => 1.0,
        (Urgency::Medium, a) if a != Availability::OneHour => 0.8,
        _ => 0.5,
    }
}

fn explain(intent: &Intent, provider: &ProviderCandidate, exact_match: bool) -> Vec<String> {
    let mut reasons = Vec::new();

    if exact_match {
        reasons.push(format!("Specialist in {}", intent.service_category));
    }
    if intent.urgency == Urgency::High && provider.availability == Availability::Now {
        reasons.push("Available right now for urgent requests".to_string());
    }
    if provider.distance_km <= NEARBY_KM {
        reasons.push(format!("Only {:.1} km away", provider.distance_km));
    }
    if provider.trust_score >= HIGH_TRUST_SCORE {
        reasons.push(format!("Highly trusted (trust score {})", provider.trust_score));
    }
    if provider.rating >= TOP_RATING {
        reasons.push(format!("Top rated ({:.1}★)", provider.rating));
    }
    if provider.completion_rate >= HIGH_COMPLETION_RATE {
        reasons.push(format!("{:.1}% job completion rate", provider.completion_rate));
    }
    if provider.response_time_min <= FAST_RESPONSE_MIN {
        reasons.push(format!("Responds within {} min", provider.response_time_min));
    }
    if provider.fraud_risk <= LOW_FRAUD_RISK {
        reasons.push("Very low fraud risk".to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_providers;
    use crate::intent::IntentClassifier;
    use crate::model::{Complexity, PriceRange};

    fn intent(category: ServiceCategory, urgency: Urgency) -> Intent {
        Intent {
            service_category: category,
            urgency,
            location: "Mirpur, Dhaka".to_string(),
            complexity: Complexity::Moderate,
            confidence: 0.9,
            matched_keyword: Some("test".to_string()),
        }
    }

    fn candidate(id: &str, specialties: &[ServiceCategory]) -> ProviderCandidate {
        ProviderCandidate {
            id: id.to_string(),
            name: format!("Provider {id}"),
            rating: 4.5,
            trust_score: 90,
            distance_km: 3.0,
            response_time_min: 20,
            completion_rate: 95.0,
            specialties: specialties.iter().copied().collect(),
            price_range: PriceRange { min: 400, max: 800 },
            availability: Availability::ThirtyMinutes,
            fraud_risk: 0.03,
        }
    }

    #[test]
    fn never_returns_more_than_top_n() {
        let providers = seed_providers();
        let general = intent(ServiceCategory::General, Urgency::Medium);
        for n in 0..=providers.len() + 2 {
            let ranked = rank(&general, &providers, n);
            assert!(ranked.len() <= n);
        }
    }

    #[test]
    fn only_specialists_for_specific_categories() {
        let providers = seed_providers();
        for category in ServiceCategory::ALL {
            if category == ServiceCategory::General {
                continue;
            }
            let ranked = rank(&intent(category, Urgency::Medium), &providers, 10);
            assert!(!ranked.is_empty(), "no providers for {category}");
            for r in &ranked {
                assert!(r.provider.specialties.contains(&category));
            }
        }
    }

    #[test]
    fn output_is_sorted_non_increasing() {
        let providers = seed_providers();
        for urgency in [Urgency::Low, Urgency::Medium, Urgency::High] {
            let ranked = rank(&intent(ServiceCategory::General, urgency), &providers, 10);
            for pair in ranked.windows(2) {
                assert!(pair[0].ml_score >= pair[1].ml_score);
            }
        }
    }

    #[test]
    fn general_category_ranks_non_specialists() {
        let candidates = vec![
            candidate("a", &[ServiceCategory::Plumbing]),
            candidate("b", &[ServiceCategory::Tutoring]),
        ];
        let ranked = rank(&intent(ServiceCategory::General, Urgency::Low), &candidates, 5);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.breakdown.specialty == 0.3));

        let ranked = rank(&intent(ServiceCategory::Painting, Urgency::Low), &candidates, 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn score_matches_weighted_formula() {
        let mut p = candidate("a", &[ServiceCategory::Plumbing]);
        p.availability = Availability::Now;
        p.completion_rate = 100.0;
        p.fraud_risk = 0.0;
        p.trust_score = 100;
        p.rating = 5.0;
        p.distance_km = 0.0;

        let ranked = rank(&intent(ServiceCategory::Plumbing, Urgency::High), &[p], 1);
        let expected = 0.30 + 0.20 + 0.25 + 0.15 + 0.10;
        assert!((ranked[0].ml_score - expected).abs() < 1e-9);
    }

    #[test]
    fn availability_alignment_table() {
        assert_eq!(availability_alignment(Urgency::High, Availability::Now), 1.0);
        assert_eq!(availability_alignment(Urgency::High, Availability::ThirtyMinutes), 0.5);
        assert_eq!(availability_alignment(Urgency::Medium, Availability::ThirtyMinutes), 0.8);
        assert_eq!(availability_alignment(Urgency::Medium, Availability::OneHour), 0.5);
        assert_eq!(availability_alignment(Urgency::Low, Availability::Now), 0.5);
    }

    #[test]
    fn far_providers_get_zero_distance_score() {
        let mut p = candidate("far", &[ServiceCategory::Painting]);
        p.distance_km = 25.0;
        let ranked = rank(&intent(ServiceCategory::Painting, Urgency::Low), &[p], 1);
        assert_eq!(ranked[0].breakdown.distance, 0.0);
    }

    #[test]
    fn explanations_follow_thresholds() {
        let providers = seed_providers();
        let intent = IntentClassifier::default().classify("Need AC repair today");
        let ranked = rank(&intent, &providers, 3);

        let top = &ranked[0];
        assert_eq!(top.provider.name, "Rashed Ahmed");
        let reasons = &top.why_recommended;
        assert!(reasons.contains(&"Specialist in AC & Refrigeration".to_string()));
        assert!(reasons.contains(&"Available right now for urgent requests".to_string()));
        assert!(reasons.contains(&"Only 1.2 km away".to_string()));
        assert!(reasons.contains(&"Highly trusted (trust score 96)".to_string()));
        assert!(reasons.contains(&"Very low fraud risk".to_string()));

        let plain = candidate("x", &[ServiceCategory::AcRefrigeration]);
        let ranked = rank(&intent, &[plain], 1);
        assert_eq!(
            ranked[0].why_recommended,
            vec!["Specialist in AC & Refrigeration".to_string()]
        );
    }

    #[test]
    fn ties_keep_catalog_order() {
        let candidates = vec![
            candidate("first", &[ServiceCategory::Plumbing]),
            candidate("second", &[ServiceCategory::Plumbing]),
        ];
        let ranked = rank(&intent(ServiceCategory::Plumbing, Urgency::Medium), &candidates, 2);
        assert_eq!(ranked[0].provider.id, "first");
        assert_eq!(ranked[1].provider.id, "second");
    }
}
