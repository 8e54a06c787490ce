use async_trait::async_trait;

/// Awaitable yes/no gate in front of destructive actions
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way (`--yes` on the CLI, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Confirm for FixedAnswer {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!("Auto-answering '{}' with {}", prompt, self.0);
        self.0
    }
}

/// Asks on the controlling terminal; anything other than y/yes declines
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

#[async_trait]
impl Confirm for TerminalPrompt {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            use std::io::{BufRead, Write};

            eprint!("{} [y/N] ", prompt);
            let _ = std::io::stderr().flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}
