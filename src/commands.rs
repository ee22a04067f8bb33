use crate::core::app::App;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    // Dispatch on the exact first token, so "/models list" or "/modelXYZ"
    // never parse as a different command.
    let command = parts.first().copied().unwrap_or_default();

    if command == "/log" {
        match parts.len() {
            1 => {
                // Just "/log" - toggle logging if file is set
                match app.logging.toggle_logging() {
                    Ok(message) => {
                        app.add_notice(message);
                        CommandResult::Continue
                    }
                    Err(e) => {
                        app.add_notice(format!("Error: {}", e));
                        CommandResult::Continue
                    }
                }
            }
            2 => {
                // "/log <filename>" - set log file and enable logging
                let filename = parts[1];
                match app.logging.set_log_file(filename.to_string()) {
                    Ok(message) => {
                        app.add_notice(message);
                        CommandResult::Continue
                    }
                    Err(e) => {
                        app.add_notice(format!("Error setting log file: {}", e));
                        CommandResult::Continue
                    }
                }
            }
            _ => {
                app.add_notice(
                    "Usage: /log [filename] - Enable logging to file, or /log to toggle pause/resume"
                        .to_string(),
                );
                CommandResult::Continue
            }
        }
    } else if trimmed == "/clear" {
        app.clear_transcript();
        CommandResult::Continue
    } else if command == "/model" {
        match parts.len() {
            2 => {
                let model = parts[1].to_string();
                if !app.catalog.contains(&model) {
                    app.add_notice(format!(
                        "Note: '{}' is not in the fetched model list",
                        model
                    ));
                }
                app.add_notice(format!("Model set to {}", model));
                app.set_model(model);
                CommandResult::Continue
            }
            _ => {
                app.add_notice(format!(
                    "Current model: {} - Usage: /model <id> to switch, /models to list",
                    app.model
                ));
                CommandResult::Continue
            }
        }
    } else if trimmed == "/models" {
        let header = if app.catalog.is_fallback() {
            "Available models (fallback list; catalog fetch failed):"
        } else {
            "Available models:"
        };
        app.add_notice(header.to_string());
        let models: Vec<String> = app.catalog.models().to_vec();
        for model in models {
            if model == app.model {
                app.add_notice(format!("  {} (active)", model));
            } else {
                app.add_notice(format!("  {}", model));
            }
        }
        CommandResult::Continue
    } else {
        // Not a command, process as regular message
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::Role;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn plain_text_passes_through() {
        let mut app = create_test_app();
        match process_input(&mut app, "hello there") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "hello there"),
            CommandResult::Continue => panic!("plain text should not be handled as a command"),
        }
        assert_eq!(app.transcript.len(), 1);
    }

    #[test]
    fn clear_command_resets_the_transcript() {
        let mut app = create_test_app();
        let params = app.submit_message("hello").unwrap();
        app.apply_chunk("Hi!", params.stream_id);
        app.on_stream_end(params.stream_id);
        assert_eq!(app.transcript.len(), 3);

        assert!(matches!(
            process_input(&mut app, "/clear"),
            CommandResult::Continue
        ));
        assert_eq!(app.transcript.len(), 1);
    }

    #[test]
    fn model_command_switches_the_active_model() {
        let mut app = create_test_app();
        assert!(matches!(
            process_input(&mut app, "/model llama3.2:1b"),
            CommandResult::Continue
        ));
        assert_eq!(app.model, "llama3.2:1b");
        assert_eq!(app.transcript.last().unwrap().role, Role::Notice);
        assert!(app.transcript.last().unwrap().content.contains("llama3.2:1b"));
    }

    #[test]
    fn model_command_warns_about_unknown_ids() {
        let mut app = create_test_app();
        process_input(&mut app, "/model made-up:1b");
        assert_eq!(app.model, "made-up:1b");
        let notices: Vec<&str> = app
            .transcript
            .turns()
            .iter()
            .filter(|t| t.role == Role::Notice)
            .map(|t| t.content.as_str())
            .collect();
        assert!(notices.iter().any(|n| n.contains("not in the fetched model list")));
    }

    #[test]
    fn model_like_prefixes_pass_through_as_messages() {
        let mut app = create_test_app();
        for input in ["/models list", "/modelfoo bar", "/modeling advice"] {
            match process_input(&mut app, input) {
                CommandResult::ProcessAsMessage(text) => assert_eq!(text, input),
                CommandResult::Continue => panic!("{} should not be handled as a command", input),
            }
        }
        assert_eq!(app.model, "gemma3:270m");
        assert_eq!(app.transcript.len(), 1);
    }

    #[test]
    fn models_command_during_a_stream_leaves_the_fold_intact() {
        let mut app = create_test_app();
        let params = app.submit_message("hello").unwrap();
        app.apply_chunk("He", params.stream_id);

        assert!(matches!(
            process_input(&mut app, "/models"),
            CommandResult::Continue
        ));

        app.apply_chunk("llo", params.stream_id);
        app.on_stream_end(params.stream_id);

        let turns = app.transcript.turns();
        assert_eq!(turns[2].role, Role::Assistant);
        assert_eq!(turns[2].content, "Hello");
        assert!(!app.is_streaming);
    }

    #[test]
    fn bare_model_command_reports_the_active_model() {
        let mut app = create_test_app();
        process_input(&mut app, "/model");
        let last = app.transcript.last().unwrap();
        assert!(last.content.contains("gemma3:270m"));
    }

    #[test]
    fn models_command_lists_the_catalog() {
        let mut app = create_test_app();
        process_input(&mut app, "/models");
        let contents: Vec<&str> = app
            .transcript
            .turns()
            .iter()
            .filter(|t| t.role == Role::Notice)
            .map(|t| t.content.as_str())
            .collect();
        assert!(contents[0].starts_with("Available models"));
        assert!(contents.iter().any(|c| c.contains("gemma3:270m") && c.contains("active")));
        assert!(contents.iter().any(|c| c.contains("llama3.2:1b")));
    }

    #[test]
    fn log_command_reports_missing_file() {
        let mut app = create_test_app();
        assert!(matches!(
            process_input(&mut app, "/log"),
            CommandResult::Continue
        ));
        let last = app.transcript.last().unwrap();
        assert_eq!(last.role, Role::Notice);
        assert!(last.content.contains("Error"));
    }
}
