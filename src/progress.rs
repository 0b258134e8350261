use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Spinner shown while an external tool runs
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Run `future` behind a spinner, finishing it with the outcome
pub async fn with_spinner<T, F>(message: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let pb = spinner(message);
    let result = future.await;
    match &result {
        Ok(_) => pb.finish_with_message(format!("✓ {}", message)),
        Err(_) => pb.abandon_with_message(format!("✗ {}", message)),
    }
    result
}
