//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod check;
pub mod model_list;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::check::check_gateway;
use crate::cli::model_list::list_models;
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;
use crate::utils::url::normalize_base_url;

#[derive(Parser)]
#[command(name = "vortex")]
#[command(about = "A terminal chat interface for the ODS Vortex gateway")]
#[command(
    long_about = "Vortex is a full-screen terminal chat interface that talks to an ODS Vortex \
gateway for real-time conversations. Responses stream into the transcript as they are \
generated.\n\n\
Environment Variables:\n\
  VORTEX_BASE_URL   Gateway base URL (optional, defaults to http://localhost:8000)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Esc               Interrupt a streaming response\n\
  Up/Down/PgUp/PgDn Scroll through chat history\n\
  Ctrl+C            Quit the application\n\
  Backspace         Delete characters in the input field\n\n\
Commands:\n\
  /model <id>       Switch the active model\n\
  /models           List the models the gateway advertises\n\
  /clear            Start a fresh conversation\n\
  /log <filename>   Enable transcript logging to the specified file\n\
  /log              Toggle logging pause/resume"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for chat
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Gateway base URL (overrides VORTEX_BASE_URL and the config file)
    #[arg(short = 'b', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List the models the gateway advertises
    Models,
    /// Check gateway connectivity
    Check,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words for system-prompt)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

/// Install a stderr subscriber for the one-shot commands. The chat surface
/// owns the terminal, so it never gets one.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let command = args.command.unwrap_or(Commands::Chat);
    if !matches!(command, Commands::Chat) {
        init_tracing();
    }

    match command {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value
                .filter(|parts| !parts.is_empty())
                .map(|parts| parts.join(" "));
            match key.as_str() {
                "base-url" => {
                    if let Some(raw) = value {
                        let url = normalize_base_url(&raw);
                        config.base_url = Some(url.clone());
                        config.save()?;
                        println!("✅ Set base-url to: {url}");
                    } else {
                        config.print_all();
                    }
                }
                "default-model" => {
                    if let Some(model) = value {
                        config.default_model = Some(model.clone());
                        config.save()?;
                        println!("✅ Set default-model to: {model}");
                    } else {
                        config.print_all();
                    }
                }
                "system-prompt" => {
                    if let Some(prompt) = value {
                        config.system_prompt = Some(prompt.clone());
                        config.save()?;
                        println!("✅ Set system-prompt to: {prompt}");
                    } else {
                        config.print_all();
                    }
                }
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    eprintln!("Valid keys: base-url, default-model, system-prompt");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "base-url" => {
                    config.base_url = None;
                    config.save()?;
                    println!("✅ Unset base-url");
                }
                "default-model" => {
                    config.default_model = None;
                    config.save()?;
                    println!("✅ Unset default-model");
                }
                "system-prompt" => {
                    config.system_prompt = None;
                    config.save()?;
                    println!("✅ Unset system-prompt");
                }
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    eprintln!("Valid keys: base-url, default-model, system-prompt");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Models => {
            let config = Config::load()?;
            let base_url = config.resolve_base_url(args.base_url.as_deref());
            list_models(&base_url).await
        }
        Commands::Check => {
            let config = Config::load()?;
            let base_url = config.resolve_base_url(args.base_url.as_deref());
            check_gateway(&base_url).await
        }
        Commands::Chat => {
            let config = Config::load()?;
            let base_url = config.resolve_base_url(args.base_url.as_deref());
            let model = config.resolve_model(args.model.as_deref());
            let system_prompt = config.resolve_system_prompt();
            run_chat(model, base_url, system_prompt, args.log).await
        }
    }
}
