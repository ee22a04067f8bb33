//! Shared constants used across the application

/// Gateway base URL used when neither flag, environment, nor config set one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Model requested when none is configured or selected.
pub const DEFAULT_MODEL: &str = "gemma3:270m";

/// System prompt that opens every transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are ODS Vortex AI Assistant. Respond concisely and helpfully.";

/// Space reserved for the streaming indicator + margin in the input area.
/// Rendering and input-width math must both use this to stay in sync.
pub const INDICATOR_SPACE: u16 = 4;
