//! Main chat event loop
//!
//! Owns the terminal for the duration of the session: renders frames,
//! handles keyboard input, and folds stream messages into the transcript.

use crate::commands::{process_input, CommandResult};
use crate::core::app::App;
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::ui::renderer::ui;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Size;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, time::Duration};
use tokio::sync::mpsc;

/// Width and height of the message pane for scroll math.
fn chat_viewport(size: Size) -> (u16, u16) {
    // 3 rows for the input box, 1 for the title line
    (size.width, size.height.saturating_sub(3).saturating_sub(1))
}

pub async fn run_chat(
    model: String,
    base_url: String,
    system_prompt: String,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(model, base_url, system_prompt, log_file)?;

    // Fetch the catalog once at startup. A failure keeps the fallback list
    // and must never block the chat itself.
    if let Err(e) = app.catalog.refresh(&app.client, &app.base_url).await {
        tracing::debug!(error = %e, "model catalog fetch failed; keeping fallback list");
    }

    // Setup terminal only after successful app creation
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (stream_service, mut rx) = ChatStreamService::new();

    let result = run_event_loop(&mut terminal, &mut app, &stream_service, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    stream_service: &ChatStreamService,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
) -> Result<(), Box<dyn Error>> {
    loop {
        let (width, chat_height) = chat_viewport(terminal.size()?);
        app.update_scroll_position(chat_height, width);
        terminal.draw(|f| ui(f, app))?;

        // Handle events
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.cancel_current_stream();
                        return Ok(());
                    }
                    KeyCode::Esc => {
                        app.cancel_current_stream();
                    }
                    KeyCode::Enter => {
                        handle_enter(app, stream_service);
                    }
                    KeyCode::Char(c) => {
                        app.input.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Up => {
                        app.scroll_up(1);
                    }
                    KeyCode::Down => {
                        let (width, chat_height) = chat_viewport(terminal.size()?);
                        app.scroll_down(1, chat_height, width);
                    }
                    KeyCode::PageUp => {
                        let (_, chat_height) = chat_viewport(terminal.size()?);
                        app.scroll_up(chat_height.max(1));
                    }
                    KeyCode::PageDown => {
                        let (width, chat_height) = chat_viewport(terminal.size()?);
                        app.scroll_down(chat_height.max(1), chat_height, width);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Handle streaming updates - drain all available messages
        let mut received_any = false;
        while let Ok((message, stream_id)) = rx.try_recv() {
            match message {
                StreamMessage::Chunk(text) => app.apply_chunk(&text, stream_id),
                StreamMessage::Error(error) => app.on_stream_error(&error, stream_id),
                StreamMessage::End => app.on_stream_end(stream_id),
            }
            received_any = true;
        }
        if received_any {
            continue; // Force a redraw after processing all updates
        }
    }
}

fn handle_enter(app: &mut App, stream_service: &ChatStreamService) {
    let input_text = app.input.trim().to_string();
    if input_text.is_empty() {
        return;
    }
    app.input.clear();

    match process_input(app, &input_text) {
        CommandResult::Continue => {}
        CommandResult::ProcessAsMessage(message) => {
            if app.is_streaming {
                // Sending is disabled while a response is streaming; keep
                // the draft in the input box.
                app.input = input_text;
            } else if let Ok(params) = app.submit_message(&message) {
                stream_service.spawn_stream(params);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn viewport_reserves_input_box_and_title() {
        let (width, height) = chat_viewport(Size::new(80, 24));
        assert_eq!(width, 80);
        assert_eq!(height, 20);

        // Tiny terminals never underflow
        let (_, height) = chat_viewport(Size::new(10, 2));
        assert_eq!(height, 0);
    }

    #[tokio::test]
    async fn enter_submits_a_typed_message() {
        let (service, mut rx) = ChatStreamService::new();
        let mut app = create_test_app();
        app.input = "hello".to_string();

        handle_enter(&mut app, &service);

        assert!(app.input.is_empty());
        assert!(app.is_streaming);
        assert_eq!(app.transcript.len(), 3);
        // The spawned task owns the other end; nothing arrives synchronously.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn enter_while_streaming_keeps_the_draft() {
        let (service, _rx) = ChatStreamService::new();
        let mut app = create_test_app();
        app.input = "first".to_string();
        handle_enter(&mut app, &service);

        app.input = "second".to_string();
        handle_enter(&mut app, &service);

        assert_eq!(app.input, "second");
        assert_eq!(app.current_stream_id, 1);
    }

    #[tokio::test]
    async fn enter_dispatches_commands_even_while_streaming() {
        let (service, _rx) = ChatStreamService::new();
        let mut app = create_test_app();
        app.input = "hello".to_string();
        handle_enter(&mut app, &service);
        assert!(app.is_streaming);

        app.input = "/clear".to_string();
        handle_enter(&mut app, &service);

        assert!(!app.is_streaming);
        assert_eq!(app.transcript.len(), 1);
        assert!(app.input.is_empty());
    }
}
