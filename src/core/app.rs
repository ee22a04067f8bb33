use std::error::Error as StdError;
use std::fmt;
use std::time::Instant;

use ratatui::text::Line;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::api::models::ModelCatalog;
use crate::api::ChatMessage;
use crate::core::chat_stream::{StreamError, StreamParams};
use crate::core::transcript::{Transcript, Turn};
use crate::utils::logging::LoggingState;
use crate::utils::scroll::ScrollCalculator;

/// Why a send was rejected. Both cases leave the transcript untouched; the
/// chat surface treats them as quiet no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The input was blank after trimming.
    EmptyInput,
    /// A response stream is already in flight for this transcript.
    Busy,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::EmptyInput => write!(f, "nothing to send"),
            SubmitError::Busy => write!(f, "a response is already streaming"),
        }
    }
}

impl StdError for SubmitError {}

/// Central session state: the transcript, the in-flight stream bookkeeping,
/// and everything the renderer needs each frame.
///
/// At most one stream is active at a time. Every stream gets a fresh id and
/// cancellation token from [`App::start_new_stream`]; incoming messages
/// tagged with an older id are ignored, so a cancelled or superseded stream
/// can never write into the transcript again. The reply turn is addressed
/// through `open_turn` rather than by last position: slash commands run
/// mid-stream append notices behind it, and those must never receive
/// chunks.
pub struct App {
    pub transcript: Transcript,
    pub input: String,
    pub client: Client,
    pub model: String,
    pub base_url: String,
    pub catalog: ModelCatalog,
    pub logging: LoggingState,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub is_streaming: bool,
    pub pulse_start: Instant,
    pub stream_cancel_token: Option<CancellationToken>,
    pub current_stream_id: u64,
    /// Index of the assistant turn the active stream folds into.
    pub open_turn: Option<usize>,
}

impl App {
    pub fn new(
        model: String,
        base_url: String,
        system_prompt: String,
        log_file: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        eprintln!("🚀 Starting Vortex - Terminal Chat Interface");
        eprintln!("📡 Using model: {}", model);
        eprintln!("🌐 Gateway: {}", base_url);
        if let Some(ref log_path) = log_file {
            eprintln!("📝 Logging to: {}", log_path);
        }
        eprintln!("💡 Press Ctrl+C to quit, Enter to send messages");

        let logging = LoggingState::new(log_file)?;
        if logging.is_active() {
            logging.log_session_start()?;
        }

        Ok(App {
            transcript: Transcript::new(system_prompt),
            input: String::new(),
            client: Client::new(),
            model,
            base_url,
            catalog: ModelCatalog::fallback(),
            logging,
            scroll_offset: 0,
            auto_scroll: true,
            is_streaming: false,
            pulse_start: Instant::now(),
            stream_cancel_token: None,
            current_stream_id: 0,
            open_turn: None,
        })
    }

    /// The externally visible "send a message" operation.
    ///
    /// Checks the preconditions, appends the user turn and the open
    /// assistant placeholder, and hands back the parameters for spawning
    /// the stream task. On `Err` the transcript is byte-for-byte unchanged.
    pub fn submit_message(&mut self, text: &str) -> Result<StreamParams, SubmitError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.is_streaming {
            return Err(SubmitError::Busy);
        }

        let api_messages = self.add_user_message(trimmed.to_string());
        let (cancel_token, stream_id) = self.start_new_stream();

        Ok(StreamParams {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_messages,
            cancel_token,
            stream_id,
        })
    }

    /// Append the user turn plus the empty assistant turn the reply will
    /// stream into, and build the outgoing payload (which excludes that
    /// placeholder).
    pub fn add_user_message(&mut self, content: String) -> Vec<ChatMessage> {
        if let Err(e) = self.logging.log_message(&format!("You: {}", content)) {
            eprintln!("Failed to log message: {}", e);
        }

        self.transcript.append(Turn::user(content));
        let api_messages = self.transcript.api_messages();
        self.transcript.append(Turn::assistant(String::new()));
        self.open_turn = Some(self.transcript.len() - 1);
        api_messages
    }

    /// Mint the bookkeeping for a fresh stream, cancelling any previous one.
    pub fn start_new_stream(&mut self) -> (CancellationToken, u64) {
        self.cancel_current_stream();

        self.current_stream_id += 1;
        let token = CancellationToken::new();
        self.stream_cancel_token = Some(token.clone());
        self.is_streaming = true;
        self.pulse_start = Instant::now();

        (token, self.current_stream_id)
    }

    fn is_current_stream(&self, stream_id: u64) -> bool {
        self.is_streaming && stream_id == self.current_stream_id
    }

    /// Fold one decoded text increment into the open assistant turn.
    /// Messages from superseded streams are dropped.
    pub fn apply_chunk(&mut self, text: &str, stream_id: u64) {
        if !self.is_current_stream(stream_id) {
            return;
        }
        if let Some(index) = self.open_turn {
            self.transcript.append_to(index, text);
        }
    }

    /// A stream failed. Partial content stays; an assistant turn that never
    /// received a byte is pruned rather than left as an empty bubble.
    pub fn on_stream_error(&mut self, error: &StreamError, stream_id: u64) {
        if !self.is_current_stream(stream_id) {
            return;
        }
        if let Some(index) = self.open_turn {
            self.transcript.prune_empty_assistant(index);
        }
        self.add_notice(format!("Error: {}", error));
        self.end_stream();
    }

    /// A stream reached end-of-stream. The open assistant turn is final now;
    /// log it if transcript logging is on.
    pub fn on_stream_end(&mut self, stream_id: u64) {
        if !self.is_current_stream(stream_id) {
            return;
        }
        if let Some(index) = self.open_turn {
            if let Some(turn) = self.transcript.turns().get(index) {
                if !turn.content.is_empty() {
                    if let Err(e) = self.logging.log_message(&turn.content) {
                        eprintln!("Failed to log response: {}", e);
                    }
                }
            }
        }
        self.end_stream();
    }

    /// Explicit user cancellation. Already-appended content stays; a
    /// zero-byte placeholder is pruned just like on a failed stream.
    pub fn cancel_current_stream(&mut self) {
        if let Some(token) = &self.stream_cancel_token {
            token.cancel();
        }
        self.stream_cancel_token = None;
        if self.is_streaming {
            self.is_streaming = false;
            if let Some(index) = self.open_turn.take() {
                self.transcript.prune_empty_assistant(index);
            }
            self.add_notice("Response cancelled.".to_string());
        }
    }

    fn end_stream(&mut self) {
        self.is_streaming = false;
        self.stream_cancel_token = None;
        self.open_turn = None;
    }

    /// Reset the transcript to its original system turn. An active stream
    /// is cancelled first so nothing can land in the cleared transcript.
    pub fn clear_transcript(&mut self) {
        self.cancel_current_stream();
        let prompt = self.transcript.system_content().to_string();
        self.transcript.reset(prompt);
        self.scroll_offset = 0;
        self.auto_scroll = true;
    }

    pub fn add_notice(&mut self, content: String) {
        self.transcript.append(Turn::notice(content));
    }

    pub fn set_model(&mut self, model: String) {
        self.model = model;
    }

    pub fn get_logging_status(&self) -> String {
        self.logging.get_status_string()
    }

    pub fn build_display_lines(&self) -> Vec<Line<'static>> {
        ScrollCalculator::build_display_lines(self.transcript.turns())
    }

    pub fn calculate_wrapped_line_count(&self, terminal_width: u16) -> u16 {
        let lines = self.build_display_lines();
        ScrollCalculator::calculate_wrapped_line_count(&lines, terminal_width)
    }

    pub fn calculate_max_scroll_offset(&self, available_height: u16, terminal_width: u16) -> u16 {
        ScrollCalculator::calculate_max_scroll_offset(
            self.transcript.turns(),
            terminal_width,
            available_height,
        )
    }

    /// Keep the view pinned to the bottom while content grows, unless the
    /// user has scrolled away.
    pub fn update_scroll_position(&mut self, available_height: u16, terminal_width: u16) {
        if self.auto_scroll {
            let total_wrapped_lines = self.calculate_wrapped_line_count(terminal_width);
            if total_wrapped_lines > available_height {
                self.scroll_offset = total_wrapped_lines.saturating_sub(available_height);
            } else {
                self.scroll_offset = 0;
            }
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16, available_height: u16, terminal_width: u16) {
        let max_offset = self.calculate_max_scroll_offset(available_height, terminal_width);
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max_offset);
        // Reaching the bottom re-engages auto-scroll.
        if self.scroll_offset >= max_offset {
            self.auto_scroll = true;
        }
    }
}
