use std::fmt;

use crate::api::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
    /// Client-authored status line shown in the transcript but never
    /// transmitted to the backend.
    Notice,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Notice => "notice",
        }
    }

    /// Wire-format role name, or `None` for roles that stay client-side.
    pub fn to_api_role(self) -> Option<&'static str> {
        match self {
            Role::System => Some("system"),
            Role::User => Some("user"),
            Role::Assistant => Some("assistant"),
            Role::Notice => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn notice(content: impl Into<String>) -> Self {
        Self::new(Role::Notice, content)
    }
}

/// Error signalled by [`Transcript::replace_last`] on an empty transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyTranscript;

impl fmt::Display for EmptyTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transcript has no turns to replace")
    }
}

impl std::error::Error for EmptyTranscript {}

/// The ordered conversation history for one session.
///
/// The store is the single source of truth the renderer draws from. It
/// always begins with exactly one system turn carrying the session prompt;
/// `reset` truncates back to that turn rather than deleting it. Only the
/// session controller and the stream fold mutate it.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    system_content: String,
}

impl Transcript {
    pub fn new(system_content: impl Into<String>) -> Self {
        let system_content = system_content.into();
        Self {
            turns: vec![Turn::system(system_content.clone())],
            system_content,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn system_content(&self) -> &str {
        &self.system_content
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn replace_last(&mut self, turn: Turn) -> Result<(), EmptyTranscript> {
        match self.turns.last_mut() {
            Some(slot) => {
                *slot = turn;
                Ok(())
            }
            None => Err(EmptyTranscript),
        }
    }

    /// Append text to the content of the turn at `index`. Returns whether
    /// the turn exists. The stream fold grows the open assistant turn this
    /// way, addressed by index rather than by last position: notices
    /// appended behind it while a stream is active never receive chunks.
    pub fn append_to(&mut self, index: usize, text: &str) -> bool {
        match self.turns.get_mut(index) {
            Some(turn) => {
                turn.content.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Truncate back to a single system turn with the given content.
    pub fn reset(&mut self, system_content: impl Into<String>) {
        let system_content = system_content.into();
        self.turns.clear();
        self.turns.push(Turn::system(system_content.clone()));
        self.system_content = system_content;
    }

    /// Drop the turn at `index` if it is an assistant turn with no content
    /// yet. Returns whether a turn was removed.
    pub fn prune_empty_assistant(&mut self, index: usize) -> bool {
        let prune = matches!(
            self.turns.get(index),
            Some(turn) if turn.role == Role::Assistant && turn.content.is_empty()
        );
        if prune {
            self.turns.remove(index);
        }
        prune
    }

    /// Full ordered copy for transmission or rendering. The copy does not
    /// alias the store: callers may mutate it freely.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Wire payload for the next request: every turn with an API role, in
    /// order, excluding a trailing assistant turn that is still empty (the
    /// placeholder the reply streams into). Notices never leave the client.
    pub fn api_messages(&self) -> Vec<ChatMessage> {
        let mut skip_last = false;
        if let Some(turn) = self.turns.last() {
            skip_last = turn.role == Role::Assistant && turn.content.is_empty();
        }
        let end = if skip_last {
            self.turns.len() - 1
        } else {
            self.turns.len()
        };
        self.turns[..end]
            .iter()
            .filter_map(|turn| {
                turn.role.to_api_role().map(|role| ChatMessage {
                    role: role.to_string(),
                    content: turn.content.clone(),
                })
            })
            .collect()
    }
}
