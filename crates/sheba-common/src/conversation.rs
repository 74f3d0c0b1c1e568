use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::assistant::Assistant;
use crate::model::{Intent, PricingQuote, RankedProvider};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Idle time after which a conversation is dropped from the store.
pub const DEFAULT_CONVERSATION_TTL: Duration = Duration::from_secs(86_400);

pub const GREETING: &str = "Hi! I'm Sphero, your AI service assistant. Tell me what service \
you're looking for, and I'll find the perfect match for you!";

pub const STARTER_SUGGESTIONS: [&str; 4] = [
    "Find a plumber",
    "Need AC repair",
    "Book a tutor",
    "Hire cleaner",
];

pub type ConversationId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Content of a chat message. Each variant carries exactly the data it renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Plain {
        text: String,
        suggestions: Vec<String>,
    },
    /// The request was understood but no provider can take it.
    Analysis {
        text: String,
        intent: Intent,
        pricing: PricingQuote,
    },
    Recommendation {
        text: String,
        intent: Intent,
        providers: Vec<RankedProvider>,
        pricing: PricingQuote,
        suggestions: Vec<String>,
    },
}

impl MessageBody {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain {
            text: text.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text, .. }
            | Self::Analysis { text, .. }
            | Self::Recommendation { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    pub body: MessageBody,
}

impl ConversationMessage {
    fn new(role: Role, body: MessageBody) -> Self {
        Self {
            id: new_id(),
            role,
            timestamp: Utc::now(),
            body,
        }
    }
}

/// Ordered chat history for a single session.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: ConversationId,
    pub messages: Vec<ConversationMessage>,
    last_active: Instant,
}

impl Conversation {
    /// A new conversation opened by the assistant greeting.
    pub fn new(id: ConversationId) -> Self {
        let greeting = MessageBody::Plain {
            text: GREETING.to_string(),
            suggestions: STARTER_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            id,
            messages: vec![ConversationMessage::new(Role::Assistant, greeting)],
            last_active: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_active.elapsed() > ttl
    }

    /// Append a user message. Blank input is ignored and yields `None`.
    fn push_user(&mut self, text: &str) -> Option<&ConversationMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.messages
            .push(ConversationMessage::new(Role::User, MessageBody::plain(text)));
        self.messages.last()
    }

    fn push_assistant(&mut self, body: MessageBody) {
        self.messages
            .push(ConversationMessage::new(Role::Assistant, body));
    }

    /// Append the user's message and the assistant's reply to it.
    ///
    /// Returns the two appended messages, user first. Blank input is ignored and yields `None`.
    pub fn send(&mut self, assistant: &Assistant, text: &str) -> Option<&[ConversationMessage]> {
        let text = text.trim();
        self.push_user(text)?;
        let reply = assistant.respond(text);
        self.push_assistant(reply);
        Some(&self.messages[self.messages.len() - 2..])
    }
}

/// In-memory conversation registry. Nothing survives a restart.
///
/// Conversations idle for longer than the TTL are treated as gone and are evicted on the next
/// `start` or `get_mut`.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: HashMap<ConversationId, Conversation>,
    ttl: Duration,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CONVERSATION_TTL)
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            conversations: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn start(&mut self) -> &Conversation {
        self.evict_expired();
        let id = new_id();
        self.conversations
            .entry(id.clone())
            .or_insert_with(|| Conversation::new(id))
    }

    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations
            .get(conversation_id)
            .filter(|c| !c.is_expired(self.ttl))
    }

    /// Looks up a live conversation and marks it as active.
    pub fn get_mut(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        self.evict_expired();
        let conversation = self.conversations.get_mut(conversation_id)?;
        conversation.last_active = Instant::now();
        Some(conversation)
    }

    /// Run a user message through `assistant` in an existing conversation.
    ///
    /// `None` when the conversation is unknown or expired, or the message is blank.
    pub fn send(
        &mut self,
        assistant: &Assistant,
        conversation_id: &str,
        text: &str,
    ) -> Option<&[ConversationMessage]> {
        self.get_mut(conversation_id)?.send(assistant, text)
    }

    /// Returns whether the conversation existed.
    pub fn end(&mut self, conversation_id: &str) -> bool {
        self.conversations.remove(conversation_id).is_some()
    }

    /// Number of stored conversations, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn evict_expired(&mut self) {
        let ttl = self.ttl;
        let before = self.conversations.len();
        self.conversations.retain(|_, c| !c.is_expired(ttl));
        let evicted = before - self.conversations.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.conversations.len(), "evicted idle conversations");
        }
    }
}

/// 32 hex chars derived from the clock, process id and a counter.
pub fn new_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();

    let mut h = Sha256::new();
    h.update(now.as_nanos().to_le_bytes());
    h.update(pid.to_le_bytes());
    h.update(counter.to_le_bytes());
    let digest = h.finalize();
    hex::encode(&digest[..16])
}
