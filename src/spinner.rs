//! Progress indicator shown on stderr while the model is working.

use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// A spinner with an elapsed-time counter, drawn by a background task.
///
/// Stdout carries the JSON result, so everything here goes to stderr.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: watch::Sender<bool>,
}

impl Spinner {
    /// Start a spinner only when stderr is an interactive terminal.
    pub fn start_if_terminal(message: &str) -> Option<Self> {
        std::io::stderr()
            .is_terminal()
            .then(|| Self::start(message))
    }

    pub fn start(message: &str) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            for frame in FRAMES.iter().cycle() {
                eprint!("\x1b[2K\r{}", render(frame, &message, started.elapsed()));
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancelled.changed() => break,
                }
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self { handle, cancel }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

fn render(frame: &str, message: &str, elapsed: Duration) -> String {
    format!("{frame} {message} ({}s)", elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_single_braille_chars() {
        for frame in FRAMES {
            assert_eq!(frame.chars().count(), 1);
        }
    }

    #[test]
    fn render_shows_whole_seconds() {
        assert_eq!(
            render("⠋", "annotating", Duration::from_millis(2700)),
            "⠋ annotating (2s)"
        );
    }

    #[tokio::test]
    async fn spinner_starts_and_stops_without_panic() {
        let spinner = Spinner::start("testing");
        tokio::time::sleep(Duration::from_millis(200)).await;
        spinner.stop().await;
    }

    #[tokio::test]
    async fn spinner_immediate_stop() {
        let spinner = Spinner::start("quick");
        spinner.stop().await;
    }
}
