/// The chat assistant: classify a request, rank providers, quote a price, and phrase the reply.
use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::catalog::seed_providers;
use crate::config::PipelineConfig;
use crate::conversation::{MessageBody, STARTER_SUGGESTIONS};
use crate::error::PipelineError;
use crate::intent::IntentClassifier;
use crate::model::{Intent, PricingQuote, ProviderCandidate, RankedProvider, ServiceCategory};
use crate::pricing::PricingEstimator;
use crate::ranker;

pub const DEFAULT_TOP_N: usize = 3;

pub struct Assistant {
    classifier: IntentClassifier,
    estimator: PricingEstimator,
    catalog: Vec<ProviderCandidate>,
    top_n: usize,
}

impl Default for Assistant {
    fn default() -> Self {
        Self {
            classifier: IntentClassifier::default(),
            estimator: PricingEstimator::default(),
            catalog: seed_providers(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Assistant {
    pub fn new(
        config: PipelineConfig,
        catalog: Vec<ProviderCandidate>,
        top_n: usize,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            classifier: IntentClassifier::new(config.classifier),
            estimator: PricingEstimator::new(config.pricing)?,
            catalog,
            top_n,
        })
    }

    pub fn catalog(&self) -> &[ProviderCandidate] {
        &self.catalog
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn classify(&self, text: &str) -> Intent {
        self.classifier.classify(text)
    }

    pub fn rank(&self, intent: &Intent, top_n: usize) -> Vec<RankedProvider> {
        ranker::rank(intent, &self.catalog, top_n)
    }

    pub fn estimate(&self, intent: &Intent) -> PricingQuote {
        self.estimator.estimate(intent)
    }

    pub fn estimate_at(&self, intent: &Intent, at: NaiveDateTime) -> PricingQuote {
        self.estimator.estimate_at(intent, at)
    }

    /// Build the assistant's reply to `text`, priced against the local clock.
    pub fn respond(&self, text: &str) -> MessageBody {
        self.respond_at(text, Local::now().naive_local())
    }

    pub fn respond_at(&self, text: &str, at: NaiveDateTime) -> MessageBody {
        let intent = self.classify(text);
        let providers = self.rank(&intent, self.top_n);
        let pricing = self.estimate_at(&intent, at);

        info!(
            category = %intent.service_category,
            fallback = intent.is_fallback(),
            providers = providers.len(),
            final_price = pricing.final_price,
            "assistant reply prepared"
        );

        let price = format!(
            "Estimated price range: ৳{}-{}.",
            pricing.estimated_range_low, pricing.estimated_range_high
        );

        if intent.is_fallback() {
            let text = format!(
                "I couldn't tell exactly which service you need, so here are top-rated \
                 providers across all services. {price} Could you tell me a bit more?"
            );
            return MessageBody::Recommendation {
                text,
                intent,
                providers,
                pricing,
                suggestions: STARTER_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            };
        }

        let Some(top) = providers.first() else {
            let text = format!(
                "No verified {} providers are available near {} right now. {price}",
                intent.service_category, intent.location
            );
            return MessageBody::Analysis {
                text,
                intent,
                pricing,
            };
        };

        let available = self.eligible_count(intent.service_category);
        let text = format!(
            "Great! I found {available} verified {} {} near {}. Based on your needs, here are \
             the top matches. {price}",
            intent.service_category,
            if available == 1 { "provider" } else { "providers" },
            intent.location
        );
        let suggestions = vec![
            format!("Book {}", top.provider.name),
            "Compare prices".to_string(),
            "Find another service".to_string(),
        ];

        MessageBody::Recommendation {
            text,
            intent,
            providers,
            pricing,
            suggestions,
        }
    }

    fn eligible_count(&self, category: ServiceCategory) -> usize {
        self.catalog
            .iter()
            .filter(|p| p.specialties.contains(&category))
            .count()
    }
}
