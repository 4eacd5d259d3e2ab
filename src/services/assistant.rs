use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use crate::config::AssistantSettings;
use crate::models::{ChatRole, ChatTurn, EventContext, VendorListing};

/// Returned to the caller whenever the text-generation service cannot answer
pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble processing your request. \
     Please try again or browse our vendor categories directly.";

const API_VERSION: &str = "2023-06-01";
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Errors that can occur when talking to the text-generation service
///
/// Never surfaced to callers; [`AssistantGateway::reply`] absorbs them.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Assistant API key not configured")]
    NotConfigured,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Planning assistant backed by an external text-generation service
///
/// Builds a system prompt from the vendor directory and the caller's event
/// details, then forwards the conversation. Configuration is resolved once
/// and passed in; nothing is read from the environment here.
pub struct AssistantGateway {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    max_vendors: usize,
    history_limit: usize,
    client: Client,
}

impl AssistantGateway {
    pub fn new(settings: &AssistantSettings) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        if settings.api_key.is_none() {
            tracing::warn!("Assistant API key not set; chat will answer with the fallback message");
        }

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            max_vendors: settings.max_vendors_in_prompt,
            history_limit: settings.history_limit,
            client,
        })
    }

    /// How many listings the system prompt can describe
    pub fn max_vendors(&self) -> usize {
        self.max_vendors
    }

    /// Answer a message. Every failure degrades to [`FALLBACK_REPLY`].
    pub async fn reply(
        &self,
        message: &str,
        context: Option<&EventContext>,
        history: &[ChatTurn],
        vendors: &[VendorListing],
        caller_account_id: Option<&str>,
    ) -> String {
        let system = self.build_system_prompt(vendors, context);

        match self.complete(system, message, history, caller_account_id).await {
            Ok(text) => text,
            Err(AssistantError::NotConfigured) => FALLBACK_REPLY.to_string(),
            Err(e) => {
                tracing::error!("Assistant request failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn complete(
        &self,
        system: String,
        message: &str,
        history: &[ChatTurn],
        caller_account_id: Option<&str>,
    ) -> Result<String, AssistantError> {
        let api_key = self.api_key.as_deref().ok_or(AssistantError::NotConfigured)?;

        let recent = &history[history.len().saturating_sub(self.history_limit)..];
        let mut messages: Vec<Message<'_>> = recent
            .iter()
            .map(|turn| Message {
                role: match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: &turn.content,
            })
            .collect();
        messages.push(Message {
            role: "user",
            content: message,
        });

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages,
            metadata: caller_account_id.map(|user_id| Metadata { user_id }),
        };

        let url = format!("{}/messages", self.endpoint);
        tracing::debug!("Sending chat request with {} history turns", recent.len());

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::ApiError(format!(
                "Chat request failed: {}",
                response.status()
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(AssistantError::InvalidResponse("no text content".into()));
        }

        Ok(text)
    }

    /// System prompt describing the directory and, when given, the event
    pub fn build_system_prompt(&self, vendors: &[VendorListing], context: Option<&EventContext>) -> String {
        let vendor_lines = vendors
            .iter()
            .take(self.max_vendors)
            .map(|v| {
                format!(
                    "- {} ({}): {}... Price: {}, Location: {}",
                    v.business_name,
                    v.category,
                    preview(&v.description),
                    v.price_range,
                    v.location
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let event_details = context.map(describe_event).unwrap_or_default();

        format!(
            "You are an expert Arangetram event planning assistant. Arangetram is a classical Indian \
dance debut performance, typically Bharatanatyam.

Your role is to help users plan their Arangetram by:
1. Understanding their requirements (date, budget, guest count, preferences)
2. Recommending vendors from our Bay Area database
3. Explaining the typical components of an Arangetram (venue, catering, musicians, photographer, videographer, decorations)
4. Providing culturally informed advice

Available vendors in our database:
{vendor_lines}

{event_details}

Be helpful, warm, and culturally sensitive. Keep responses concise but informative. \
If asked about specific vendor categories, recommend from the available vendors."
        )
    }
}

fn preview(description: &str) -> String {
    description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect()
}

fn describe_event(context: &EventContext) -> String {
    let unspecified = "Not specified";
    format!(
        "Event Details:\n- Date: {}\n- Guests: {}\n- Budget: {}\n- Location: {}\n",
        context.event_date.as_deref().unwrap_or(unspecified),
        context.guest_count.as_ref().map(plain).unwrap_or_else(|| unspecified.to_string()),
        context.budget.as_ref().map(plain).unwrap_or_else(|| unspecified.to_string()),
        context.location.as_deref().unwrap_or("Bay Area"),
    )
}

/// Strings without their JSON quotes, everything else as JSON
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
