use crate::webhook::custom_webhook::post_json;
use serde_json::json;

/// Slack Incoming Webhooks accept `{ "text": "..." }`.
pub fn build_slack_payload(text: &str, title: Option<&str>) -> String {
    let content = match title {
        Some(t) => format!("*{}*\n{}", t, text),
        None => text.to_string(),
    };
    json!({ "text": content }).to_string()
}

pub async fn send_slack(url: &str, text: &str, title: Option<&str>) {
    post_json("Slack", url, &build_slack_payload(text, title), "application/json").await;
}
