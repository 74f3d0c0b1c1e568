/// Rule-based intent classifier for free-text service requests.
///
/// Each facet of the intent (category, urgency, location, complexity) is decided by its own
/// ordered rule table. Rules are evaluated top to bottom and the first match wins. English
/// keywords must not touch another ASCII letter or digit, so "accept" is not an AC request
/// while "acটা" is. Bengali terms are matched as substrings since they are commonly followed
/// by case suffixes.
use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::model::{Complexity, Intent, ServiceCategory, Urgency};

pub const DEFAULT_LOCATION: &str = "Mirpur, Dhaka";
const FALLBACK_CONFIDENCE: f64 = 0.45;

/// Category rules in precedence order: (category, english keywords, bengali terms).
const CATEGORY_RULES: &[(ServiceCategory, &[&str], &[&str])] = &[
    (
        ServiceCategory::AcRefrigeration,
        &[
            "ac",
            "air ?con(?:ditioner|ditioning)?",
            "aircon",
            "fridge",
            "refrigerator",
            "freezer",
            "cooling",
        ],
        &["এসি", "ফ্রিজ", "রেফ্রিজারেটর", "শীতাতপ"],
    ),
    (
        ServiceCategory::Plumbing,
        &[
            "plumb(?:er|ers|ing)",
            "pipes?",
            "leak(?:s|ing|age)?",
            "taps?",
            "faucets?",
            "drains?",
            "toilets?",
            "water heater",
            "geyser",
        ],
        &["প্লাম্বার", "পাইপ", "পানির লাইন", "লিকেজ", "ট্যাপ"],
    ),
    (
        ServiceCategory::Electrical,
        &[
            "electric(?:ian|al|ity)?",
            "wiring",
            "sockets?",
            "switch(?:es)?",
            "circuits?",
            "breakers?",
            "fans?",
            "lights?",
            "power outage",
        ],
        &["ইলেকট্রিশিয়ান", "বিদ্যুৎ", "বৈদ্যুতিক", "ওয়্যারিং", "ফ্যান", "সুইচ"],
    ),
    (
        ServiceCategory::HomeCleaning,
        &[
            "clean(?:er|ers|ing)?",
            "maid",
            "sanitiz(?:e|ation)",
            "housekeeping",
        ],
        &["পরিষ্কার", "ক্লিনার", "ক্লিনিং", "বুয়া"],
    ),
    (
        ServiceCategory::Tutoring,
        &[
            "tutor(?:s|ing)?",
            "teachers?",
            "tuition",
            "lessons?",
            "homework",
            "coaching",
            "exam prep",
        ],
        &["টিউটর", "শিক্ষক", "টিউশন", "প্রাইভেট পড়া"],
    ),
    (
        ServiceCategory::BeautyWellness,
        &[
            "salon",
            "parlou?r",
            "haircut",
            "facial",
            "massage",
            "spa",
            "makeup",
            "yoga",
            "manicure",
            "pedicure",
        ],
        &["পার্লার", "ম্যাসাজ", "স্পা", "মেকআপ", "ফেসিয়াল"],
    ),
    (
        ServiceCategory::Painting,
        &["paint(?:er|ers|ing)?", "wall colou?r"],
        &["পেইন্ট", "রং করা", "রঙ"],
    ),
];

/// Explicit urgency first, then soft time words, then distant ones.
const URGENCY_RULES: &[(Urgency, &[&str], &[&str])] = &[
    (
        Urgency::High,
        &[
            "urgent(?:ly)?",
            "emergency",
            "asap",
            "immediately",
            "right now",
            "today",
            "tonight",
        ],
        &["জরুরি", "এখনই", "আজ"],
    ),
    (
        Urgency::Medium,
        &["tomorrow", "soon"],
        &["আগামীকাল", "শীঘ্রই"],
    ),
    (
        Urgency::Low,
        &["weeks?", "months?", "whenever", "no rush"],
        &["সপ্তাহ", "মাস"],
    ),
];

/// Neighbourhoods recognised in requests, as (area, english spellings, bengali spellings).
pub const NEIGHBOURHOODS: &[(&str, &[&str], &[&str])] = &[
    ("Gulshan", &["gulshan"], &["গুলশান"]),
    ("Banani", &["banani"], &["বনানী"]),
    ("Dhanmondi", &["dhanmondi"], &["ধানমন্ডি"]),
    ("Mirpur", &["mirpur"], &["মিরপুর"]),
    ("Uttara", &["uttara"], &["উত্তরা"]),
    ("Mohammadpur", &["mohammadpur"], &["মোহাম্মদপুর"]),
    ("Bashundhara", &["bashundhara"], &["বসুন্ধরা"]),
    ("Motijheel", &["motijheel"], &["মতিঝিল"]),
    ("Old Dhaka", &["old dhaka", "puran dhaka"], &["পুরান ঢাকা"]),
];

/// Replace beats repair beats inspect.
const COMPLEXITY_RULES: &[(Complexity, &[&str], &[&str])] = &[
    (
        Complexity::Complex,
        &[
            "replace(?:ment)?",
            "install(?:ation)?",
            "overhaul",
            "rewir(?:e|ing)",
            "renovat(?:e|ion)",
        ],
        &["বদলা", "ইনস্টল", "নতুন লাগা"],
    ),
    (
        Complexity::Moderate,
        &[
            "repair(?:ing)?",
            "fix(?:ing)?",
            "broken",
            "leak(?:s|ing|age)?",
            "not working",
        ],
        &["ঠিক", "মেরামত", "নষ্ট"],
    ),
    (
        Complexity::Simple,
        &[
            "inspect(?:ion)?",
            "check(?:up)?",
            "servicing",
            "service",
            "maintenance",
        ],
        &["চেক", "পরীক্ষা", "সার্ভিসিং"],
    ),
];

fn default_confidence(category: ServiceCategory) -> f64 {
    match category {
        ServiceCategory::AcRefrigeration => 0.94,
        ServiceCategory::Plumbing => 0.92,
        ServiceCategory::Electrical => 0.90,
        ServiceCategory::HomeCleaning => 0.89,
        ServiceCategory::Tutoring => 0.87,
        ServiceCategory::BeautyWellness => 0.85,
        ServiceCategory::Painting => 0.84,
        ServiceCategory::General => FALLBACK_CONFIDENCE,
    }
}

/// Fixed confidence reported for each category branch.
///
/// Values are a lookup table, not a measure of match strength. `overrides` replaces individual
/// entries; categories without an override keep their built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTable {
    pub overrides: BTreeMap<ServiceCategory, f64>,
    /// Confidence reported when no rule matched
    pub fallback: f64,
}

impl Default for ConfidenceTable {
    fn default() -> Self {
        Self {
            overrides: BTreeMap::new(),
            fallback: FALLBACK_CONFIDENCE,
        }
    }
}

impl ConfidenceTable {
    pub fn get(&self, category: ServiceCategory) -> f64 {
        if category == ServiceCategory::General {
            return self.fallback;
        }
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_confidence(category))
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        for category in ServiceCategory::ALL {
            let value = self.get(category);
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::ConfidenceOutOfRange {
                    category: category.label().to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub confidence: ConfidenceTable,
    /// Location reported when the request names no known neighbourhood
    pub default_location: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceTable::default(),
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }
}

struct Rule<T> {
    value: T,
    pattern: Regex,
}

impl<T: Copy> Rule<T> {
    fn table(rules: &[(T, &[&str], &[&str])]) -> Vec<Self> {
        rules
            .iter()
            .map(|(value, english, bengali)| Rule {
                value: *value,
                pattern: keyword_pattern(english, bengali),
            })
            .collect()
    }
}

/// First rule whose pattern occurs in `text`, with the matched keyword.
fn first_match<'a, T: Copy>(rules: &[Rule<T>], text: &'a str) -> Option<(T, &'a str)> {
    rules.iter().find_map(|rule| {
        let caps = rule.pattern.captures(text)?;
        let keyword = caps.name("en").or_else(|| caps.name("bn"))?;
        Some((rule.value, keyword.as_str()))
    })
}

/// English keywords are bounded by ASCII only: Unicode `\b` treats Bengali letters as word
/// characters and would reject mixed-script words like "acটা" or "plumberকে".
fn keyword_pattern(english: &[&str], bengali: &[&str]) -> Regex {
    let mut alternatives = Vec::new();
    if !english.is_empty() {
        alternatives.push(format!(
            "(?:^|[^a-z0-9])(?P<en>{})(?:[^a-z0-9]|$)",
            english.join("|")
        ));
    }
    if !bengali.is_empty() {
        let escaped: Vec<String> = bengali.iter().map(|t| regex::escape(t)).collect();
        alternatives.push(format!("(?P<bn>{})", escaped.join("|")));
    }
    Regex::new(&alternatives.join("|")).expect("valid regex")
}

pub struct IntentClassifier {
    categories: Vec<Rule<ServiceCategory>>,
    urgency: Vec<Rule<Urgency>>,
    locations: Vec<Rule<&'static str>>,
    complexity: Vec<Rule<Complexity>>,
    config: ClassifierConfig,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl IntentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            categories: Rule::table(CATEGORY_RULES),
            urgency: Rule::table(URGENCY_RULES),
            locations: Rule::table(NEIGHBOURHOODS),
            complexity: Rule::table(COMPLEXITY_RULES),
            config,
        }
    }

    /// Classify a free-text request. Never fails; unmatched facets take their defaults.
    pub fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();

        let (service_category, matched_keyword) = match first_match(&self.categories, &lowered) {
            Some((category, keyword)) => (category, Some(keyword.to_string())),
            None => (ServiceCategory::General, None),
        };

        let urgency = first_match(&self.urgency, &lowered)
            .map(|(u, _)| u)
            .unwrap_or(Urgency::Medium);

        let location = first_match(&self.locations, &lowered)
            .map(|(area, _)| format!("{area}, Dhaka"))
            .unwrap_or_else(|| self.config.default_location.clone());

        let complexity = first_match(&self.complexity, &lowered)
            .map(|(c, _)| c)
            .unwrap_or(Complexity::Moderate);

        let confidence = self.config.confidence.get(service_category);

        debug!(
            category = %service_category,
            ?urgency,
            %location,
            ?complexity,
            confidence,
            keyword = matched_keyword.as_deref().unwrap_or("-"),
            "classified request"
        );

        Intent {
            service_category,
            urgency,
            location,
            complexity,
            confidence,
            matched_keyword,
        }
    }
}
