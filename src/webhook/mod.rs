pub mod custom_webhook;
pub mod discord;
pub mod slack;

pub use crate::webhook::discord::{Webhook, WebhookConfig, WebhookType};

use crate::domain::Domain;
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Provisioned,
    Failed(String),
}

pub fn build_message(domain: &Domain, host: &str, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Provisioned => format!(
            "Moodle provisioned on {}\nSite: https://{}",
            host, domain
        ),
        Outcome::Failed(reason) => format!(
            "Moodle provisioning failed on {}\nSite: https://{}\nError: {}",
            host, domain, reason
        ),
    }
}

pub fn configured_webhooks() -> Vec<(WebhookType, String)> {
    [
        (WebhookType::Discord, "DISCORD_WEBHOOK_URL"),
        (WebhookType::Slack, "SLACK_WEBHOOK_URL"),
        (WebhookType::Custom, "CUSTOM_WEBHOOK_URL"),
    ]
    .into_iter()
    .filter_map(|(kind, var)| {
        env::var(var)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| (kind, url))
    })
    .collect()
}

/// Best effort; delivery problems are logged by each sender and never fail the run.
pub async fn notify(domain: &Domain, host: &str, outcome: &Outcome) {
    let message = build_message(domain, host, outcome);
    let title = format!("moodle_provisioner: {}", domain);
    for (kind, url) in configured_webhooks() {
        Webhook::new(WebhookConfig::new(&title, &url, kind, &message))
            .send()
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_host_site_and_error() {
        let domain = Domain::parse("lms.example.org").unwrap();
        let ok = build_message(&domain, "web01", &Outcome::Provisioned);
        assert_eq!(ok, "Moodle provisioned on web01\nSite: https://lms.example.org");

        let failed = build_message(&domain, "web01", &Outcome::Failed("step 'tls' failed".into()));
        assert!(failed.starts_with("Moodle provisioning failed on web01\n"));
        assert!(failed.ends_with("Error: step 'tls' failed"));
    }
}
