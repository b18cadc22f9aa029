use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Settings;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("feedback relay not configured")]
    NotConfigured,
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("failed to build email: {0}")]
    BuildEmail(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Subject and body of one feedback note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackNote {
    pub subject: String,
    pub body: String,
}

impl FeedbackNote {
    pub fn new(username: &str, feedback: &str) -> Self {
        let username = if username.trim().is_empty() {
            "anonymous"
        } else {
            username
        };
        Self {
            subject: format!("BotCure Feedback from {username}"),
            body: format!("Feedback from user: {username}\n\n{feedback}"),
        }
    }

    /// Single-text rendering for chat webhooks.
    fn as_chat_text(&self) -> String {
        format!("*{}*\n\n{}", self.subject, self.body)
    }
}

struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
}

struct WebhookChannel {
    http: reqwest::Client,
    url: String,
}

enum Channel {
    Smtp(SmtpChannel),
    Webhook(WebhookChannel),
}

impl Channel {
    fn name(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "smtp",
            Self::Webhook(_) => "webhook",
        }
    }
}

/// Delivers user feedback by email when SMTP credentials are set, else to a chat webhook.
pub struct FeedbackRelay {
    channel: Option<Channel>,
}

impl FeedbackRelay {
    pub fn from_settings(http: reqwest::Client, settings: &Settings) -> Self {
        if let (Some(user), Some(pass)) = (&settings.email_user, &settings.email_pass) {
            match smtp_channel(settings, user, pass) {
                Ok(channel) => {
                    tracing::info!(host = %settings.smtp_host, port = settings.smtp_port, "Feedback relay using SMTP");
                    return Self {
                        channel: Some(Channel::Smtp(channel)),
                    };
                }
                Err(e) => tracing::error!(error = %e, "SMTP feedback relay unavailable"),
            }
        }

        Self::webhook(http, settings.feedback_webhook_url.clone())
    }

    pub fn webhook(http: reqwest::Client, url: Option<String>) -> Self {
        Self {
            channel: url.map(|url| Channel::Webhook(WebhookChannel { http, url })),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.channel.is_some()
    }

    pub fn channel_name(&self) -> Option<&'static str> {
        self.channel.as_ref().map(Channel::name)
    }

    pub async fn send(&self, username: &str, feedback: &str) -> Result<(), FeedbackError> {
        let note = FeedbackNote::new(username, feedback);

        let result = match &self.channel {
            None => {
                tracing::warn!("Feedback received but no relay is configured");
                return Err(FeedbackError::NotConfigured);
            }
            Some(Channel::Smtp(smtp)) => send_email(smtp, &note).await,
            Some(Channel::Webhook(hook)) => post_webhook(hook, &note).await,
        };

        if let Err(e) = &result {
            tracing::error!(error = %e, "Feedback delivery failed");
        }
        result
    }
}

fn smtp_channel(settings: &Settings, user: &str, pass: &str) -> Result<SmtpChannel, FeedbackError> {
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
        .map_err(|e| FeedbackError::Delivery(e.to_string()))?
        .port(settings.smtp_port)
        .credentials(Credentials::new(user.to_string(), pass.to_string()))
        .build();

    Ok(SmtpChannel {
        transport,
        from: user.to_string(),
        to: settings
            .feedback_email_to
            .clone()
            .unwrap_or_else(|| user.to_string()),
    })
}

fn build_email(from: &str, to: &str, note: &FeedbackNote) -> Result<Message, FeedbackError> {
    let from = from
        .parse()
        .map_err(|e| FeedbackError::InvalidAddress(format!("From: {e}")))?;
    let to = to
        .parse()
        .map_err(|e| FeedbackError::InvalidAddress(format!("To: {e}")))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(&note.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(note.body.clone())
        .map_err(|e| FeedbackError::BuildEmail(e.to_string()))
}

async fn send_email(smtp: &SmtpChannel, note: &FeedbackNote) -> Result<(), FeedbackError> {
    let message = build_email(&smtp.from, &smtp.to, note)?;
    smtp.transport
        .send(message)
        .await
        .map_err(|e| FeedbackError::Delivery(e.to_string()))?;
    tracing::info!("Feedback emailed");
    Ok(())
}

async fn post_webhook(hook: &WebhookChannel, note: &FeedbackNote) -> Result<(), FeedbackError> {
    let payload = serde_json::json!({ "text": note.as_chat_text() });

    let resp = hook
        .http
        .post(&hook.url)
        .json(&payload)
        .timeout(WEBHOOK_TIMEOUT)
        .send()
        .await
        .map_err(|e| FeedbackError::Delivery(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(FeedbackError::Delivery(format!(
            "webhook returned {}",
            resp.status()
        )));
    }
    Ok(())
}
