//! Feed transport.
//!
//! Stands in for the push-delivery transport: replays inbound events from a
//! JSON-lines feed (a file or stdin) on a background thread and calls the
//! [`DeliveryCallback`] for each one, exactly as a messaging daemon would.
//!
//! # Wire shape
//!
//! One JSON object per line:
//!
//! ```text
//! {"type":"token","token":"abc"}
//! {"type":"message","data":{"title":"Hi","body":"World"}}
//! {"type":"message","data":{"body":"later"},"delay_ms":1500}
//! ```
//!
//! `delay_ms` waits before delivering that line. Blank lines are skipped;
//! malformed lines are logged and skipped. End of input ends the thread.

// Rust guideline compliant 2026-02

use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::delivery::{DeliveryCallback, InboundData};

/// One inbound event as it appears on the feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundEvent {
    /// Token issued or refreshed.
    Token {
        /// The new token.
        token: String,
    },
    /// Message received.
    Message {
        /// Data payload; `title`/`body` are read from here.
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl InboundEvent {
    /// Hands the event to the delivery callback.
    pub fn deliver(self, callback: &DeliveryCallback) {
        match self {
            Self::Token { token } => callback.on_token_refreshed(token),
            Self::Message { data } => callback.on_message_received(&InboundData::from_json(&data)),
        }
    }
}

/// A feed line: an event plus an optional delivery delay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedLine {
    /// The event.
    #[serde(flatten)]
    pub event: InboundEvent,
    /// Milliseconds to wait before delivering.
    #[serde(default)]
    pub delay_ms: u64,
}

/// Parses one feed line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<FeedLine>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .context("Malformed feed line")
}

/// Where the feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Standard input.
    Stdin,
    /// A file on disk.
    File(PathBuf),
}

impl FeedSource {
    /// `-` means stdin, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Whether this source reads stdin.
    pub fn is_stdin(&self) -> bool {
        matches!(self, Self::Stdin)
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Counters reported when a feed ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Lines handed to the delivery callback.
    pub delivered: usize,
    /// Malformed lines skipped.
    pub skipped: usize,
}

/// Reads `reader` to the end, delivering each event.
///
/// Lines that are not valid UTF-8 count as malformed. Only a read error ends
/// the feed early.
pub async fn run_feed<R>(mut reader: R, callback: &DeliveryCallback) -> Result<FeedStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = FeedStats::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read feed")?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            log::warn!("[Feed] Skipping line {}: not valid UTF-8", line_no);
            stats.skipped += 1;
            continue;
        };
        match parse_line(line) {
            Ok(Some(feed_line)) => {
                if feed_line.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(feed_line.delay_ms)).await;
                }
                feed_line.event.deliver(callback);
                stats.delivered += 1;
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("[Feed] Skipping line {}: {:#}", line_no, e);
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

/// Background thread running a feed.
#[derive(Debug)]
pub struct FeedHandle {
    thread: JoinHandle<Result<FeedStats>>,
}

impl FeedHandle {
    /// Whether the feed has reached its end (or failed).
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the feed thread and returns its result.
    pub fn join(self) -> Result<FeedStats> {
        self.thread
            .join()
            .map_err(|panic| anyhow::anyhow!("Feed thread panicked: {:?}", panic))?
    }
}

/// Starts delivering `source` on a dedicated thread.
pub fn spawn_feed(source: FeedSource, callback: DeliveryCallback) -> Result<FeedHandle> {
    let thread = std::thread::Builder::new()
        .name("feed-transport".to_string())
        .spawn(move || -> Result<FeedStats> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .enable_time()
                .build()
                .context("Failed to build feed runtime")?;

            runtime.block_on(async {
                log::info!("[Feed] Reading inbound events from {}", source);
                let stats = match &source {
                    FeedSource::Stdin => {
                        run_feed(BufReader::new(tokio::io::stdin()), &callback).await?
                    }
                    FeedSource::File(path) => {
                        let file = tokio::fs::File::open(path)
                            .await
                            .with_context(|| format!("Failed to open feed {}", path.display()))?;
                        run_feed(BufReader::new(file), &callback).await?
                    }
                };
                log::info!(
                    "[Feed] {} finished: {} delivered, {} skipped",
                    source,
                    stats.delivered,
                    stats.skipped
                );
                Ok::<FeedStats, anyhow::Error>(stats)
            })
        })
        .context("Failed to spawn feed thread")?;

    Ok(FeedHandle { thread })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::UiDispatcher;
    use crate::platform::LogPresenter;
    use crate::state::{NotificationState, RegistrationToken};
    use std::sync::Arc;

    #[test]
    fn test_parse_token_line() {
        let line = parse_line(r#"{"type":"token","token":"abc"}"#)
            .expect("parse")
            .expect("line");
        assert_eq!(
            line.event,
            InboundEvent::Token {
                token: "abc".to_string()
            }
        );
        assert_eq!(line.delay_ms, 0);
    }

    #[test]
    fn test_parse_message_line_with_delay() {
        let line = parse_line(r#"{"type":"message","data":{"title":"Hi"},"delay_ms":5}"#)
            .expect("parse")
            .expect("line");
        assert_eq!(line.delay_ms, 5);
        match line.event {
            InboundEvent::Message { data } => assert_eq!(data["title"], "Hi"),
            InboundEvent::Token { .. } => panic!("Expected message"),
        }
    }

    #[test]
    fn test_parse_message_without_data() {
        let line = parse_line(r#"{"type":"message"}"#).expect("parse").expect("line");
        assert_eq!(
            line.event,
            InboundEvent::Message {
                data: serde_json::Value::Null
            }
        );
    }

    #[test]
    fn test_parse_blank_and_malformed() {
        assert!(parse_line("   ").expect("blank").is_none());
        assert!(parse_line("{not json").is_err());
        assert!(parse_line(r#"{"type":"unknown"}"#).is_err());
    }

    #[test]
    fn test_feed_source_from_arg() {
        assert_eq!(FeedSource::from_arg("-"), FeedSource::Stdin);
        assert_eq!(
            FeedSource::from_arg("events.jsonl"),
            FeedSource::File(PathBuf::from("events.jsonl"))
        );
    }

    #[tokio::test]
    async fn test_run_feed_delivers_in_order() {
        let (notifier, mut dispatcher) = UiDispatcher::channel();
        let state = NotificationState::shared(notifier);
        let callback = DeliveryCallback::new(Arc::clone(&state), Arc::new(LogPresenter));

        let feed = concat!(
            "{\"type\":\"token\",\"token\":\"one\"}\n",
            "\n",
            "garbage\n",
            "{\"type\":\"message\",\"data\":{\"title\":\"Hi\",\"body\":\"World\"}}\n",
            "{\"type\":\"token\",\"token\":\"two\"}\n",
        );
        let stats = run_feed(feed.as_bytes(), &callback).await.expect("feed");

        assert_eq!(stats, FeedStats { delivered: 3, skipped: 1 });
        assert_eq!(state.current_token(), Some(RegistrationToken::new("two")));
        let message = state.current_message().expect("message");
        assert_eq!(message.title(), Some("Hi"));
        assert_eq!(message.body(), Some("World"));
        assert_eq!(dispatcher.pump(), 3);
    }

    #[tokio::test]
    async fn test_run_feed_skips_invalid_utf8_line() {
        let (notifier, _dispatcher) = UiDispatcher::channel();
        let state = NotificationState::shared(notifier);
        let callback = DeliveryCallback::new(Arc::clone(&state), Arc::new(LogPresenter));

        let feed: &[u8] = b"{\"type\":\"token\",\"token\":\"one\"}\n\
            {\"type\":\"message\",\"data\":{\"title\":\"\xff\xfe\"}}\n\
            {\"type\":\"token\",\"token\":\"two\"}\n";
        let stats = run_feed(feed, &callback).await.expect("feed");

        assert_eq!(stats, FeedStats { delivered: 2, skipped: 1 });
        assert_eq!(state.current_token(), Some(RegistrationToken::new("two")));
        assert!(state.current_message().is_none());
    }

    #[test]
    fn test_spawn_feed_missing_file_reports_error() {
        let (notifier, _dispatcher) = UiDispatcher::channel();
        let state = NotificationState::shared(notifier);
        let callback = DeliveryCallback::new(state, Arc::new(LogPresenter));

        let handle = spawn_feed(
            FeedSource::File(PathBuf::from("/nonexistent/feed.jsonl")),
            callback,
        )
        .expect("spawn");
        assert!(handle.join().is_err());
    }
}
