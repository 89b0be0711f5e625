//! Social feed capability: trending topics and posting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{outcome_of, Capability, Outcome, Params};
use crate::config::SocialConfig;
use crate::error::{Error, Result};
use crate::alog;

pub const MAX_POST_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub topic: String,
    #[serde(default)]
    pub volume: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostReceipt {
    pub id: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

pub trait FeedProvider {
    fn trends(&self) -> Result<Vec<Trend>>;
    fn post(&mut self, text: &str) -> Result<PostReceipt>;
}

#[derive(Debug, Default)]
pub struct InMemoryFeed {
    trends: Vec<Trend>,
    posts: Vec<PostReceipt>,
}

impl InMemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trends(trends: Vec<Trend>) -> Self {
        Self {
            trends,
            posts: Vec::new(),
        }
    }
}

impl FeedProvider for InMemoryFeed {
    fn trends(&self) -> Result<Vec<Trend>> {
        Ok(self.trends.clone())
    }

    fn post(&mut self, text: &str) -> Result<PostReceipt> {
        let receipt = PostReceipt {
            id: format!("post-{}", self.posts.len() + 1),
            text: text.to_string(),
            posted_at: Utc::now(),
        };
        self.posts.push(receipt.clone());
        Ok(receipt)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum SocialAction {
    Trends {
        #[serde(default)]
        limit: Option<usize>,
    },
    Post {
        text: String,
    },
}

pub struct SocialCapability {
    config: SocialConfig,
    feed: Box<dyn FeedProvider>,
}

impl SocialCapability {
    pub const NAME: &'static str = "social";

    pub fn new(config: SocialConfig, feed: Box<dyn FeedProvider>) -> Self {
        Self { config, feed }
    }

    fn run(&mut self, params: &Params) -> Result<Outcome> {
        let handle = match self.config.handle.as_deref() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(Error::NotConfigured("no social handle configured".to_string())),
        };

        let mut params = params.clone();
        params
            .entry("action")
            .or_insert_with(|| Value::String("trends".to_string()));
        let action: SocialAction = serde_json::from_value(Value::Object(params))
            .map_err(|e| Error::Validation(format!("invalid social request: {}", e)))?;

        match action {
            SocialAction::Trends { limit } => {
                let mut trends = self.feed.trends()?;
                if let Some(limit) = limit {
                    trends.truncate(limit);
                }
                let topics: Vec<&str> = trends.iter().map(|t| t.topic.as_str()).collect();
                let message = if topics.is_empty() {
                    "No trending topics right now".to_string()
                } else {
                    format!("Trending: {}", topics.join(", "))
                };
                Ok(Outcome::ok(message).with_data(&trends))
            }
            SocialAction::Post { text } => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(Error::Validation("post text must not be empty".to_string()));
                }
                let chars = text.chars().count();
                if chars > MAX_POST_CHARS {
                    return Err(Error::Validation(format!(
                        "post is {} characters, limit is {}",
                        chars, MAX_POST_CHARS
                    )));
                }
                let receipt = self.feed.post(text)?;
                alog!("Posted {} as {}", receipt.id, handle);
                Ok(Outcome::ok(format!("Posted as {}", handle)).with_data(&receipt))
            }
        }
    }
}

impl Capability for SocialCapability {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Read trending topics and publish posts"
    }

    fn execute(&mut self, params: &Params) -> Outcome {
        outcome_of(self.run(params))
    }
}
