use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::Completer;

/// A scripted completer for tests. Returns pre-defined replies in order
/// and records every prompt it receives.
pub struct MockCompleter {
    replies: Vec<std::result::Result<String, String>>,
    index: AtomicUsize,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompleter {
    pub fn new(replies: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A completer that always answers with `text` once.
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    /// A completer whose single call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message.to_string())])
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Completer for MockCompleter {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.replies.get(i) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
            None => Err(anyhow::anyhow!(
                "MockCompleter: no more replies (called {} times)",
                i + 1
            )),
        }
    }
}
