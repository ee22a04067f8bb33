//! Terminal UI layer for the interactive chat session.
//!
//! [`chat_loop`] owns the interaction loop: it dispatches input to
//! [`crate::commands`] and folds messages from
//! [`crate::core::chat_stream`] into the transcript. [`renderer`] draws
//! one frame from the current [`crate::core::app::App`] state.

pub mod chat_loop;
pub mod renderer;
