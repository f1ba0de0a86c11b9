use crate::webhook::custom_webhook::send_custom;
use crate::webhook::slack::send_slack;
use discord_webhook_lib::DiscordMessage;
use log::warn;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookType {
    Discord,
    Slack,
    Custom,
}

pub struct WebhookConfig {
    title: String,
    url: String,
    pub webhook_type: WebhookType,
    message: String,
}

impl WebhookConfig {
    pub fn new(title: &str, url: &str, webhook_type: WebhookType, message: &str) -> WebhookConfig {
        WebhookConfig {
            title: title.to_string(),
            url: url.to_string(),
            webhook_type,
            message: message.to_string(),
        }
    }
}

pub struct Webhook {
    pub webhook_config: WebhookConfig,
}

impl Webhook {
    pub fn new(config: WebhookConfig) -> Webhook {
        Webhook {
            webhook_config: config,
        }
    }

    pub fn custom_body(&self) -> String {
        json!({
            "title": self.webhook_config.title.as_str(),
            "message": self.webhook_config.message.as_str(),
        })
        .to_string()
    }

    pub async fn send(&self) {
        let config = &self.webhook_config;
        match config.webhook_type {
            WebhookType::Discord => {
                let mut message = DiscordMessage::builder(config.url.as_str());
                message.add_message(config.message.as_str());
                message.add_field("title", config.title.as_str());
                let sender = message.build();

                if let Err(e) = sender.send().await {
                    warn!("failed to send Discord webhook: {}", e)
                }
            }
            WebhookType::Slack => {
                send_slack(
                    config.url.as_str(),
                    config.message.as_str(),
                    Some(config.title.as_str()),
                )
                .await;
            }
            WebhookType::Custom => {
                send_custom(config.url.as_str(), &self.custom_body(), "application/json").await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn custom_body_carries_title_and_message() {
        let hook = Webhook::new(WebhookConfig::new(
            "moodle_provisioner: lms.example.org",
            "https://hooks.example.org/x",
            WebhookType::Custom,
            "Moodle provisioned",
        ));
        let val: Value = serde_json::from_str(&hook.custom_body()).expect("valid json");
        assert_eq!(val["title"], "moodle_provisioner: lms.example.org");
        assert_eq!(val["message"], "Moodle provisioned");
    }
}
