use std::future::Future;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

use super::report::FailureReason;

/// Decides whether a failed connection cycle should start over
pub trait RetryPolicy {
    fn should_retry(&mut self, reason: FailureReason) -> impl Future<Output = bool> + Send;
}

/// Asks on the terminal. Only an answer of "y" retries; end of input or a
/// read error counts as "no".
pub struct PromptRetry {
    stdin: BufReader<Stdin>,
}

impl PromptRetry {
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for PromptRetry {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy for PromptRetry {
    async fn should_retry(&mut self, reason: FailureReason) -> bool {
        let mut stdout = tokio::io::stdout();
        let prompt = format!("\n{reason}. Retry? (y/n) ");
        if let Err(e) = stdout.write_all(prompt.as_bytes()).await {
            log::warn!("Unable to write retry prompt: {e}");
        }
        let _ = stdout.flush().await;

        let mut line = String::new();
        match self.stdin.read_line(&mut line).await {
            Ok(0) => false,
            Ok(_) => is_yes(&line),
            Err(e) => {
                log::warn!("Unable to read retry answer: {e}");
                false
            }
        }
    }
}

/// Returns true for a "y" answer, ignoring case and surrounding whitespace
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Retries automatically a fixed number of times
#[derive(Debug, Clone)]
pub struct LimitedRetry {
    remaining: u32,
}

impl LimitedRetry {
    pub fn new(retries: u32) -> Self {
        Self { remaining: retries }
    }
}

impl RetryPolicy for LimitedRetry {
    async fn should_retry(&mut self, reason: FailureReason) -> bool {
        if self.remaining == 0 {
            log::info!("No retries left after: {reason}");
            return false;
        }
        self.remaining -= 1;
        log::info!("Retrying after: {reason} ({} retries left)", self.remaining);
        true
    }
}
