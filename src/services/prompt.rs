//! Prompt composition — system/user instruction pairs per chat mode.
//!
//! DESIGN
//! ======
//! Context always lives in the system instruction; the user turn is the raw
//! incoming message. Ticket chat substitutes a ticket snapshot into a persona
//! template, with literal placeholders for missing fields so composition is
//! total. Formatting rules are read once at startup from an external style
//! file and appended to every chat persona; an unreadable file degrades to no
//! extra rules rather than failing startup.

use std::path::Path;

use tracing::warn;

pub const DEFAULT_STYLE_PATH: &str = "prompts/chat_style.txt";

pub const MISSING_TITLE: &str = "Unknown";
pub const MISSING_DESCRIPTION: &str = "No description";
pub const MISSING_SUMMARY: &str = "No summary available";

const GLOBAL_PERSONA: &str = "You are TicketTutor's global study assistant: a friendly tutor for students \
     across all subjects. Lead with the direct answer, then the explanation. \
     Ground abstract ideas in concrete examples, and ask at most one clarifying \
     question when a request is vague. Stay educational and supportive; politely \
     decline anything else.";

const TICKET_PERSONA: &str = "You are TicketTutor's ticket-focused study assistant, helping a student work \
     through one specific support ticket.\n\n\
     Ticket title: {title}\n\
     Ticket description: {description}\n\
     AI summary: {ai_summary}\n\n\
     The ticket above is the source of truth for this conversation: keep every \
     answer anchored to its subject, and use the description when you need an \
     example. If the student drifts to an unrelated topic, point them at the \
     global chat and steer back to \"{title}\". Ask one focused clarifying \
     question when their message is unclear.";

const SUMMARY_PERSONA: &str = "You are an educational AI tutor.";

// =============================================================================
// TYPES
// =============================================================================

/// A composed request: the system instruction plus the raw user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInstruction {
    pub system: String,
    pub user: String,
}

/// Ticket snapshot consumed by ticket-mode composition. Fields are optional
/// so callers never have to invent values; substitution handles the gaps.
#[derive(Debug, Clone, Default)]
pub struct TicketContext {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ai_summary: Option<String>,
}

// =============================================================================
// COMPOSER
// =============================================================================

/// Builds chat instructions. Constructed once at startup with the loaded
/// style rules; read-only afterwards.
pub struct PromptComposer {
    style: String,
}

impl PromptComposer {
    /// Load style rules from `CHAT_STYLE_PATH` (default
    /// [`DEFAULT_STYLE_PATH`]).
    #[must_use]
    pub fn from_env() -> Self {
        let path = std::env::var("CHAT_STYLE_PATH").unwrap_or_else(|_| DEFAULT_STYLE_PATH.to_string());
        Self { style: load_style(Path::new(&path)) }
    }

    #[must_use]
    pub fn with_style(style: impl Into<String>) -> Self {
        Self { style: style.into() }
    }

    /// Compose a global-chat instruction.
    #[must_use]
    pub fn global(&self, message: &str) -> ChatInstruction {
        ChatInstruction {
            system: self.append_style(GLOBAL_PERSONA.to_string()),
            user: message.to_string(),
        }
    }

    /// Compose a ticket-chat instruction from a ticket snapshot. Missing
    /// fields substitute literal placeholders; composition never fails.
    #[must_use]
    pub fn ticket(&self, message: &str, ticket: &TicketContext) -> ChatInstruction {
        let title = ticket.title.as_deref().unwrap_or(MISSING_TITLE);
        let description = ticket.description.as_deref().unwrap_or(MISSING_DESCRIPTION);
        let ai_summary = ticket.ai_summary.as_deref().unwrap_or(MISSING_SUMMARY);
        let system = TICKET_PERSONA
            .replace("{title}", title)
            .replace("{description}", description)
            .replace("{ai_summary}", ai_summary);
        ChatInstruction { system: self.append_style(system), user: message.to_string() }
    }

    /// Build the one-shot summarization instruction used at ticket creation.
    /// Style rules are chat formatting and do not apply to stored summaries.
    #[must_use]
    pub fn summary(title: &str, description: &str) -> ChatInstruction {
        ChatInstruction {
            system: SUMMARY_PERSONA.to_string(),
            user: format!(
                "Summarize this educational ticket title and description concisely for a helpdesk:\n\
                 Title: {title}\nDescription: {description}"
            ),
        }
    }

    fn append_style(&self, persona: String) -> String {
        if self.style.is_empty() {
            persona
        } else {
            format!("{persona}\n\n{}", self.style)
        }
    }
}

fn load_style(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "style file unreadable, continuing without style rules");
            String::new()
        }
    }
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
