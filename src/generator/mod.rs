//! Content generation
//!
//! The orchestrator only depends on the [`PostGenerator`] trait; the concrete
//! backend is interchangeable plumbing. The shipped implementation talks to
//! an OpenAI-compatible chat-completions endpoint (OpenRouter by default) and
//! asks for strict JSON output, which is parsed defensively since models like
//! to wrap replies in markdown fences.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::source::ArticleSeed;

// ============================================================================
// Generator Interface
// ============================================================================

/// Context handed to the generator so it can vary its angle per topic
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Topic to write about
    pub topic: String,

    /// Completed publish cycles for this topic
    pub loop_index: u64,

    /// Last published titles for this topic (bounded window)
    pub recent_titles: Vec<String>,

    /// Optional trending-article seed from the topic source
    pub seed: Option<ArticleSeed>,
}

/// A generated post ready for publication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    /// Post title, also the dedup key and publish label
    pub title: String,

    /// Short meta description for SEO
    #[serde(default)]
    pub meta_description: String,

    /// Opaque HTML payload forwarded verbatim to the publisher
    pub body: String,
}

/// Prompt-to-post backend consumed by the orchestrator
#[async_trait]
pub trait PostGenerator: Send + Sync {
    /// Generate title, meta description and body for a topic
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedPost>;
}

// ============================================================================
// OpenRouter Client
// ============================================================================

/// Chat-completions request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Clip text to at most `limit` bytes without splitting a character
fn clip(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Post generator backed by an OpenAI-compatible chat-completions API
pub struct OpenRouterGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl OpenRouterGenerator {
    /// Create a generator with the given configuration
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { client, config })
    }

    /// Build the SEO-copywriter prompt for a topic
    ///
    /// The loop index and recent-title window steer the model away from
    /// angles it already covered; the seed article grounds the post in
    /// something currently trending.
    fn build_prompt(&self, request: &GenerationRequest) -> String {
        let mut prompt = format!(
            "You are an experienced SEO copywriter.\n\
             Write a 300-400 word, unique blog post about the topic \"{topic}\".\n\
             Include the keyword \"{keyword}\" naturally 2-3 times.\n\
             This is publish cycle {cycle} for this topic, so pick an angle \
             not used in earlier cycles.\n",
            topic = request.topic,
            keyword = request.topic.to_lowercase(),
            cycle = request.loop_index + 1,
        );

        if !request.recent_titles.is_empty() {
            prompt.push_str("\nTitles already published for this topic; the new title must differ from all of them:\n");
            for title in &request.recent_titles {
                prompt.push_str(&format!("- {title}\n"));
            }
        }

        if let Some(seed) = &request.seed {
            prompt.push_str(&format!(
                "\nBase the post on this trending article and cite it with a link:\n\
                 Title: {}\nSource URL: {}\nSnippet: {}\n",
                seed.title, seed.link, seed.summary
            ));
            if !seed.body_preview.is_empty() {
                prompt.push_str(&format!("Body preview: {}\n", seed.body_preview));
            }
        }

        prompt.push_str(
            "\nRespond with a single JSON object and nothing else:\n\
             {\"title\": \"catchy post title\", \
             \"meta_description\": \"max 155 chars\", \
             \"body\": \"full post as HTML, H2 headline, H3 sub-headings\"}\n",
        );

        prompt
    }

    /// Extract a JSON object from the model reply, stripping code fences
    fn extract_json(text: &str) -> &str {
        if let Some(start) = text.find("```json") {
            if let Some(end) = text[start + 7..].find("```") {
                return text[start + 7..start + 7 + end].trim();
            }
        }

        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if end > start {
                return &text[start..=end];
            }
        }

        text.trim()
    }

    fn parse_post(&self, topic: &str, content: &str) -> Result<GeneratedPost> {
        let json = Self::extract_json(content);

        let post: GeneratedPost = serde_json::from_str(json).map_err(|e| {
            tracing::warn!(
                topic = topic,
                error = %e,
                reply = clip(content, 200),
                "Model reply was not valid post JSON"
            );
            Error::generation(topic, format!("unparseable model reply: {e}"))
        })?;

        if post.title.trim().is_empty() {
            return Err(Error::generation(topic, "model returned an empty title"));
        }

        Ok(post)
    }
}

#[async_trait]
impl PostGenerator for OpenRouterGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedPost> {
        let url = format!("{}/chat/completions", self.config.endpoint);

        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: self.build_prompt(request),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut http_request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| Error::generation(&request.topic, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::generation(
                &request.topic,
                format!("backend returned {status}: {}", clip(&text, 200)),
            ));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(&request.topic, format!("malformed response: {e}")))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| Error::generation(&request.topic, "response contained no choices"))?;

        self.parse_post(&request.topic, content)
    }
}

// ============================================================================
// Tests
// ============================================================================
