/// MCP server exposing the SHEBA-AI service-request pipeline.
///
/// Exposes tools for one-shot classification, ranking and pricing, a stateful chat session,
/// and contextual recommendations.
use std::sync::Arc;
use std::time::Duration;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::MAX_TOP_N;
use sheba_common::assistant::Assistant;
use sheba_common::conversation::ConversationStore;
use sheba_common::mcp_api::{
    AcceptRecommendationResponse, ClassifyResponse, ContextualRecommendationsParams,
    ConversationParams, ConversationResponse, EstimatePriceResponse, MessageView, OkResponse,
    ProviderListResponse, RankProvidersParams, RankProvidersResponse, RecommendationIdParams,
    RecommendationsResponse, RecordServiceUsageParams, SendMessageParams, SendMessageResponse,
    ServiceRequestParams,
};
use sheba_common::recommend::{ContextSnapshot, RecommendationEngine, Weather};

/// Mutable session state, shared across tool calls.
pub struct AppState {
    pub conversations: ConversationStore,
    pub recommendations: RecommendationEngine,
    pub weather: Weather,
}

#[derive(Clone)]
pub struct ShebaAssistantServer {
    assistant: Arc<Assistant>,
    state: Arc<RwLock<AppState>>,
    thinking_delay: Duration,
    tool_router: ToolRouter<ShebaAssistantServer>,
}

impl ShebaAssistantServer {
    pub fn new(assistant: Assistant, thinking_delay: Duration, conversation_ttl: Duration) -> Self {
        let weather = Weather::default();
        let state = Arc::new(RwLock::new(AppState {
            conversations: ConversationStore::with_ttl(conversation_ttl),
            recommendations: RecommendationEngine::new(ContextSnapshot::now(weather)),
            weather,
        }));

        Self {
            assistant: Arc::new(assistant),
            state,
            thinking_delay,
            tool_router: Self::tool_router(),
        }
    }
}

fn required(value: &str, field: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(value.to_string())
}

#[tool_router]
impl ShebaAssistantServer {
    #[tool(description = "Classify a free-text service request (English or Bengali) into service category, urgency, location and complexity.")]
    async fn classify_request(
        &self,
        Parameters(params): Parameters<ServiceRequestParams>,
    ) -> Result<Json<ClassifyResponse>, String> {
        let intent = self.assistant.classify(&params.text);
        Ok(Json(ClassifyResponse {
            category_label: intent.service_category.label().to_string(),
            fallback: intent.is_fallback(),
            intent,
        }))
    }

    #[tool(description = "Classify a request and rank matching providers by weighted score (specialty, distance, trust, availability, reliability). Returns the best matches first.")]
    async fn rank_providers(
        &self,
        Parameters(params): Parameters<RankProvidersParams>,
    ) -> Result<Json<RankProvidersResponse>, String> {
        let limit = params
            .limit
            .map(|n| (n as usize).min(MAX_TOP_N))
            .unwrap_or_else(|| self.assistant.top_n());

        let intent = self.assistant.classify(&params.text);
        let providers = self.assistant.rank(&intent, limit);
        Ok(Json(RankProvidersResponse { intent, providers }))
    }

    #[tool(description = "Classify a request and estimate a dynamic price range in BDT, listing every adjustment applied (urgency, complexity, location, time of day, weekend).")]
    async fn estimate_price(
        &self,
        Parameters(params): Parameters<ServiceRequestParams>,
    ) -> Result<Json<EstimatePriceResponse>, String> {
        let intent = self.assistant.classify(&params.text);
        let pricing = self.assistant.estimate(&intent);
        Ok(Json(EstimatePriceResponse { intent, pricing }))
    }

    #[tool(description = "List every provider in the catalog.")]
    async fn list_providers(&self) -> Result<Json<ProviderListResponse>, String> {
        Ok(Json(ProviderListResponse {
            providers: self.assistant.catalog().to_vec(),
        }))
    }

    #[tool(description = "Start a chat session with the assistant. Returns the conversation_id and the greeting.")]
    async fn start_conversation(&self) -> Result<Json<ConversationResponse>, String> {
        let mut state = self.state.write().await;
        let conversation = state.conversations.start();
        info!(conversation_id = %conversation.id, "conversation started");
        Ok(Json(ConversationResponse {
            conversation_id: conversation.id.clone(),
            messages: conversation.messages.iter().map(MessageView::from).collect(),
        }))
    }

    #[tool(description = "Send a chat message. The assistant analyses the request and replies with matched providers and a price estimate.")]
    async fn send_message(
        &self,
        Parameters(params): Parameters<SendMessageParams>,
    ) -> Result<Json<SendMessageResponse>, String> {
        let message = required(&params.message, "message")?;
        let conversation_id = params.conversation_id;

        if self.state.read().await.conversations.get(&conversation_id).is_none() {
            return Err(format!("unknown conversation_id: {conversation_id}"));
        }

        // The assistant "thinks" without holding the state lock.
        tokio::time::sleep(self.thinking_delay).await;

        let mut state = self.state.write().await;
        let exchange = state
            .conversations
            .send(&self.assistant, &conversation_id, &message)
            .ok_or_else(|| format!("conversation {conversation_id} ended before the reply"))?;
        let [user, reply] = exchange else {
            return Err("conversation recorded an incomplete exchange".to_string());
        };
        let (user, reply) = (MessageView::from(user), MessageView::from(reply));

        Ok(Json(SendMessageResponse {
            conversation_id,
            user,
            reply,
        }))
    }

    #[tool(description = "Get the full message history of a chat session.")]
    async fn get_conversation(
        &self,
        Parameters(params): Parameters<ConversationParams>,
    ) -> Result<Json<ConversationResponse>, String> {
        let state = self.state.read().await;
        let conversation = state
            .conversations
            .get(&params.conversation_id)
            .ok_or_else(|| format!("unknown conversation_id: {}", params.conversation_id))?;
        Ok(Json(ConversationResponse {
            conversation_id: conversation.id.clone(),
            messages: conversation.messages.iter().map(MessageView::from).collect(),
        }))
    }

    #[tool(description = "End a chat session and discard its history.")]
    async fn end_conversation(
        &self,
        Parameters(params): Parameters<ConversationParams>,
    ) -> Result<Json<OkResponse>, String> {
        let ended = self.state.write().await.conversations.end(&params.conversation_id);
        Ok(Json(OkResponse { ok: ended }))
    }

    #[tool(description = "Get contextual service recommendations for the current time of day, weather and the user's booking history. Pass weather to update the conditions.")]
    async fn contextual_recommendations(
        &self,
        Parameters(params): Parameters<ContextualRecommendationsParams>,
    ) -> Result<Json<RecommendationsResponse>, String> {
        let mut state = self.state.write().await;
        if let Some(weather) = params.weather {
            state.weather = weather;
        }
        let context = ContextSnapshot::now(state.weather);
        let recommendations = state.recommendations.refresh(context).to_vec();
        Ok(Json(RecommendationsResponse {
            context: state.recommendations.context().clone(),
            recommendations,
        }))
    }

    #[tool(description = "Record that the user engaged with a service family (e.g. 'cleaning', 'wellness') and return the refreshed recommendations.")]
    async fn record_service_usage(
        &self,
        Parameters(params): Parameters<RecordServiceUsageParams>,
    ) -> Result<Json<RecommendationsResponse>, String> {
        let category = required(&params.category, "category")?.to_lowercase();
        let mut state = self.state.write().await;
        let recommendations = state.recommendations.record_usage(&category).to_vec();
        Ok(Json(RecommendationsResponse {
            context: state.recommendations.context().clone(),
            recommendations,
        }))
    }

    #[tool(description = "Dismiss a recommendation by ID.")]
    async fn dismiss_recommendation(
        &self,
        Parameters(params): Parameters<RecommendationIdParams>,
    ) -> Result<Json<OkResponse>, String> {
        let dismissed = self.state.write().await.recommendations.dismiss(&params.id);
        Ok(Json(OkResponse { ok: dismissed }))
    }

    #[tool(description = "Accept a recommendation by ID. Records its category in the booking history and removes it from the list.")]
    async fn accept_recommendation(
        &self,
        Parameters(params): Parameters<RecommendationIdParams>,
    ) -> Result<Json<AcceptRecommendationResponse>, String> {
        let mut state = self.state.write().await;
        let accepted = state
            .recommendations
            .accept(&params.id)
            .ok_or_else(|| format!("unknown recommendation id: {}", params.id))?;
        Ok(Json(AcceptRecommendationResponse {
            accepted,
            recommendations: state.recommendations.recommendations().to_vec(),
        }))
    }
}

#[tool_handler]
impl ServerHandler for ShebaAssistantServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sheba-assistant".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SHEBA-AI BD service assistant. Use classify_request, rank_providers and \
estimate_price for one-shot analysis of a service request (English or Bengali). For chat, call \
start_conversation, then send_message with the returned conversation_id. \
contextual_recommendations suggests services for the current conditions; record_service_usage, \
accept_recommendation and dismiss_recommendation update them."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheba_common::conversation::{MessageBody, Role};
    use sheba_common::model::ServiceCategory;
    use sheba_common::recommend::WeatherCondition;

    fn server() -> ShebaAssistantServer {
        ShebaAssistantServer::new(Assistant::default(), Duration::ZERO, Duration::from_secs(60))
    }

    #[test]
    fn tools_publish_output_schemas() {
        let tools = ShebaAssistantServer::tool_router().list_all();
        for name in [
            "classify_request",
            "rank_providers",
            "estimate_price",
            "list_providers",
            "start_conversation",
            "send_message",
            "get_conversation",
            "end_conversation",
            "contextual_recommendations",
            "record_service_usage",
            "dismiss_recommendation",
            "accept_recommendation",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    #[tokio::test]
    async fn classify_flags_fallback() {
        let server = server();
        let Json(matched) = server
            .classify_request(Parameters(ServiceRequestParams {
                text: "আমার এসি ঠিক করতে হবে".to_string(),
            }))
            .await
            .expect("classify");
        assert_eq!(matched.category_label, "AC & Refrigeration");
        assert!(!matched.fallback);

        let Json(unknown) = server
            .classify_request(Parameters(ServiceRequestParams {
                text: "xyz".to_string(),
            }))
            .await
            .expect("classify");
        assert_eq!(unknown.intent.service_category, ServiceCategory::General);
        assert!(unknown.fallback);
    }

    #[tokio::test]
    async fn rank_limit_is_capped() {
        let server = server();
        let Json(response) = server
            .rank_providers(Parameters(RankProvidersParams {
                text: "anything".to_string(),
                limit: Some(50),
            }))
            .await
            .expect("rank");
        assert_eq!(response.providers.len(), server.assistant.catalog().len());

        let Json(response) = server
            .rank_providers(Parameters(RankProvidersParams {
                text: "anything".to_string(),
                limit: None,
            }))
            .await
            .expect("rank");
        assert_eq!(response.providers.len(), server.assistant.top_n());
    }

    #[tokio::test]
    async fn estimate_returns_ordered_range() {
        let Json(response) = server()
            .estimate_price(Parameters(ServiceRequestParams {
                text: "Need AC repair today".to_string(),
            }))
            .await
            .expect("estimate");
        let p = &response.pricing;
        assert!(p.estimated_range_low <= p.optimal_price);
        assert!(p.optimal_price <= p.estimated_range_high);
        assert_eq!(p.factors_applied[0], "Urgent request: +40%");
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let server = server();
        let Json(started) = server.start_conversation().await.expect("start");
        assert_eq!(started.messages.len(), 1);
        let id = started.conversation_id;

        let Json(sent) = server
            .send_message(Parameters(SendMessageParams {
                conversation_id: id.clone(),
                message: "Find a plumber in Banani".to_string(),
            }))
            .await
            .expect("send");
        assert_eq!(sent.user.role, Role::User);
        assert_eq!(sent.reply.role, Role::Assistant);
        match &sent.reply.body {
            MessageBody::Recommendation { intent, providers, .. } => {
                assert_eq!(intent.service_category, ServiceCategory::Plumbing);
                assert_eq!(intent.location, "Banani, Dhaka");
                assert!(!providers.is_empty());
            }
            other => panic!("expected recommendation, got {other:?}"),
        }

        let Json(history) = server
            .get_conversation(Parameters(ConversationParams {
                conversation_id: id.clone(),
            }))
            .await
            .expect("history");
        assert_eq!(history.messages.len(), 3);

        let Json(ended) = server
            .end_conversation(Parameters(ConversationParams {
                conversation_id: id.clone(),
            }))
            .await
            .expect("end");
        assert!(ended.ok);

        let err = server
            .send_message(Parameters(SendMessageParams {
                conversation_id: id,
                message: "hello".to_string(),
            }))
            .await
            .err()
            .expect("unknown conversation");
        assert!(err.starts_with("unknown conversation_id"));
    }

    #[tokio::test]
    async fn expired_conversations_are_unknown() {
        let server =
            ShebaAssistantServer::new(Assistant::default(), Duration::ZERO, Duration::from_millis(20));
        let Json(started) = server.start_conversation().await.expect("start");
        tokio::time::sleep(Duration::from_millis(40)).await;

        let err = server
            .get_conversation(Parameters(ConversationParams {
                conversation_id: started.conversation_id,
            }))
            .await
            .err()
            .expect("expired conversation");
        assert!(err.starts_with("unknown conversation_id"));
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let server = server();
        let Json(started) = server.start_conversation().await.expect("start");
        let err = server
            .send_message(Parameters(SendMessageParams {
                conversation_id: started.conversation_id,
                message: "   ".to_string(),
            }))
            .await
            .err()
            .expect("blank message");
        assert_eq!(err, "message must not be empty");
    }

    #[tokio::test]
    async fn recommendation_lifecycle() {
        let server = server();
        let Json(response) = server
            .contextual_recommendations(Parameters(ContextualRecommendationsParams {
                weather: Some(Weather {
                    temperature_c: 36.0,
                    condition: WeatherCondition::Sunny,
                    humidity: 80.0,
                }),
            }))
            .await
            .expect("recommendations");
        assert_eq!(response.context.weather.temperature_c, 36.0);
        assert!(response
            .recommendations
            .iter()
            .any(|r| r.id == "loc-ac-repair"));

        let Json(accepted) = server
            .accept_recommendation(Parameters(RecommendationIdParams {
                id: "loc-ac-repair".to_string(),
            }))
            .await
            .expect("accept");
        assert_eq!(accepted.accepted.category, "repair");
        assert!(!accepted
            .recommendations
            .iter()
            .any(|r| r.id == "loc-ac-repair"));

        let Json(dismissed) = server
            .dismiss_recommendation(Parameters(RecommendationIdParams {
                id: "loc-ac-repair".to_string(),
            }))
            .await
            .expect("dismiss");
        assert!(!dismissed.ok);

        let Json(refreshed) = server
            .record_service_usage(Parameters(RecordServiceUsageParams {
                category: " Cleaning ".to_string(),
            }))
            .await
            .expect("record");
        assert!(refreshed
            .recommendations
            .iter()
            .any(|r| r.id == "behavior-deep-clean"));

        assert!(server
            .accept_recommendation(Parameters(RecommendationIdParams {
                id: "missing".to_string(),
            }))
            .await
            .is_err());
    }
}
