use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationMessage, MessageBody, Role};
use crate::model::{Intent, PricingQuote, ProviderCandidate, RankedProvider};
use crate::recommend::{ContextSnapshot, Recommendation, Weather};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ServiceRequestParams {
    /// Free-text request in English or Bengali, e.g. "Need AC repair today in Gulshan".
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RankProvidersParams {
    /// Free-text request in English or Bengali.
    pub text: String,
    /// Maximum number of providers to return (default: server setting, max: 10).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SendMessageParams {
    pub conversation_id: String,
    /// The user's chat message.
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConversationParams {
    pub conversation_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ContextualRecommendationsParams {
    /// Current weather. Omit to keep the last reported conditions.
    pub weather: Option<Weather>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecordServiceUsageParams {
    /// Service family the user engaged with, e.g. "cleaning" or "wellness".
    pub category: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendationIdParams {
    /// Recommendation ID such as "loc-ac-repair".
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassifyResponse {
    pub intent: Intent,
    /// Display name of the category, e.g. "AC & Refrigeration"
    pub category_label: String,
    /// True when no rule matched and the request was filed under "General"
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RankProvidersResponse {
    pub intent: Intent,
    pub providers: Vec<RankedProvider>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EstimatePriceResponse {
    pub intent: Intent,
    pub pricing: PricingQuote,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProviderListResponse {
    pub providers: Vec<ProviderCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub body: MessageBody,
}

impl From<&ConversationMessage> for MessageView {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            id: message.id.clone(),
            role: message.role,
            timestamp: message.timestamp.to_rfc3339(),
            body: message.body.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SendMessageResponse {
    pub conversation_id: String,
    pub user: MessageView,
    pub reply: MessageView,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationsResponse {
    pub context: ContextSnapshot,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AcceptRecommendationResponse {
    pub accepted: Recommendation,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OkResponse {
    pub ok: bool,
}
