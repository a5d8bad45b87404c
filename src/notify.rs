use crate::config::NotifyConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

pub const POST_PUBLISHED_SUBJECT: &str = "Your Blog Post is Live!";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification topic answered {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError>;
}

pub fn post_published_message(username: &str, title: &str) -> String {
    format!("Hi {username}, your new blog post '{title}' is now published!")
}

/// Best-effort: a failed publish is logged and dropped.
pub async fn notify_post_published(notifier: &dyn Notifier, username: &str, title: &str) {
    let message = post_published_message(username, title);
    if let Err(e) = notifier.publish(POST_PUBLISHED_SUBJECT, &message).await {
        warn!("Post notification for {} not sent: {}", username, e);
    }
}

#[derive(Serialize)]
struct Publish<'a> {
    topic: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Posts each message as JSON to a topic endpoint.
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
    topic: String,
}

impl HttpNotifier {
    pub fn new(url: &str, topic: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&Publish {
                topic: &self.topic,
                subject,
                message,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Used when no topic endpoint is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        info!("Notification [{}]: {}", subject, message);
        Ok(())
    }
}

pub fn from_config(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    let notifier: Arc<dyn Notifier> = match &config.url {
        Some(url) => Arc::new(HttpNotifier::new(url, &config.topic, config.timeout)?),
        None => Arc::new(LogNotifier),
    };
    Ok(notifier)
}
