/// Static seed catalog of service providers.
use std::collections::BTreeSet;

use crate::model::{Availability, PriceRange, ProviderCandidate, ServiceCategory};

#[allow(clippy::too_many_arguments)]
fn provider(
    id: &str,
    name: &str,
    rating: f64,
    trust_score: u8,
    distance_km: f64,
    response_time_min: u32,
    completion_rate: f64,
    specialties: &[ServiceCategory],
    price_range: (u32, u32),
    availability: Availability,
    fraud_risk: f64,
) -> ProviderCandidate {
    ProviderCandidate {
        id: id.to_string(),
        name: name.to_string(),
        rating,
        trust_score,
        distance_km,
        response_time_min,
        completion_rate,
        specialties: specialties.iter().copied().collect::<BTreeSet<_>>(),
        price_range: PriceRange {
            min: price_range.0,
            max: price_range.1,
        },
        availability,
        fraud_risk,
    }
}

/// The in-memory provider catalog used by the assistant.
pub fn seed_providers() -> Vec<ProviderCandidate> {
    use Availability::*;
    use ServiceCategory::*;

    vec![
        provider(
            "1",
            "Rashed Ahmed",
            4.9,
            96,
            1.2,
            15,
            98.7,
            &[AcRefrigeration, Electrical],
            (500, 800),
            Now,
            0.01,
        ),
        provider(
            "2",
            "Sadia Rahman",
            4.8,
            94,
            2.5,
            20,
            97.9,
            &[HomeCleaning],
            (400, 700),
            Now,
            0.02,
        ),
        provider(
            "3",
            "Kamal Hossain",
            4.7,
            92,
            3.1,
            30,
            96.4,
            &[Plumbing],
            (600, 900),
            OneHour,
            0.03,
        ),
        provider(
            "4",
            "Tanvir Islam",
            4.6,
            89,
            4.8,
            25,
            95.2,
            &[AcRefrigeration],
            (450, 750),
            ThirtyMinutes,
            0.04,
        ),
        provider(
            "5",
            "Nusrat Jahan",
            4.9,
            97,
            1.8,
            10,
            99.1,
            &[Tutoring],
            (600, 1000),
            ThirtyMinutes,
            0.01,
        ),
        provider(
            "6",
            "Mizanur Rahman",
            4.5,
            88,
            0.9,
            12,
            94.8,
            &[Electrical, Plumbing],
            (400, 650),
            Now,
            0.05,
        ),
        provider(
            "7",
            "Farzana Akter",
            4.8,
            95,
            3.6,
            20,
            98.2,
            &[BeautyWellness],
            (800, 1500),
            OneHour,
            0.02,
        ),
        provider(
            "8",
            "Abdul Karim",
            4.4,
            86,
            6.5,
            40,
            93.5,
            &[Painting, HomeCleaning],
            (2000, 3500),
            OneHour,
            0.06,
        ),
    ]
}
