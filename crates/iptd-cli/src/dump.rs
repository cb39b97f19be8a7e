use anyhow::{Context, Result};
use tokio::process::Command;

/// Capture the current ruleset with counters via `iptables-save -c`.
///
/// The core only ever sees this text blob; everything about how it was
/// obtained stays here.
pub async fn collect() -> Result<String> {
    let output = Command::new("iptables-save")
        .arg("-c")
        .output()
        .await
        .context("Failed to run iptables-save")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("iptables-save failed: {}", stderr);
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();
    tracing::debug!(bytes = text.len(), "captured iptables-save output");
    Ok(text)
}
