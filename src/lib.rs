//! Vortex is a terminal chat client for the ODS Vortex gateway.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the transcript, the session controller,
//!   configuration, and streaming orchestration.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//! - [`api`] defines the gateway wire payloads and the model catalog.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`core::app`] and
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
