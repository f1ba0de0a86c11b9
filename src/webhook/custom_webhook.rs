use log::warn;
use tokio::process::Command;

// curl keeps an HTTP client out of the dependency tree
pub(crate) async fn post_json(kind: &str, url: &str, body: &str, content_type: &str) {
    let status = Command::new("curl")
        .arg("--silent")
        .arg("--show-error")
        .arg("--fail")
        .arg("-X")
        .arg("POST")
        .arg("-H")
        .arg(format!("Content-Type: {}", content_type))
        .arg("-d")
        .arg(body)
        .arg(url)
        .status()
        .await;

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => {
            warn!("failed to send {} webhook (exit code {:?}) to {}", kind, s.code(), url);
        }
        Err(e) => {
            warn!("failed to execute curl for {} webhook: {}", kind, e);
        }
    }
}

pub async fn send_custom(url: &str, body: &str, content_type: &str) {
    post_json("Custom", url, body, content_type).await;
}
