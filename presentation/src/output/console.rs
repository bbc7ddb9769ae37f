//! Console output formatter for chat sessions

use colored::Colorize;
use logangpt_domain::{Conversation, ConversationId, Identity, Message, SessionState};

/// Badge printed in front of replies that came from web search
pub const WEB_RESULT_BADGE: &str = "WEB RESULT";

/// Formats chat state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colors on or off for the whole process.
    pub fn set_color_enabled(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// One chat bubble.
    pub fn message(message: &Message) -> String {
        if message.is_user() {
            return format!("{} {}", "you:".cyan().bold(), message.text);
        }

        let label = "LoganGPT:".green().bold();
        if message.is_web_result {
            format!(
                "{} {} {}",
                label,
                format!("[{}]", WEB_RESULT_BADGE).yellow().bold(),
                message.text
            )
        } else {
            format!("{} {}", label, message.text)
        }
    }

    /// Title line printed when a conversation is opened.
    pub fn conversation_header(conversation: &Conversation) -> String {
        Self::section_header(&conversation.title)
    }

    /// Numbered conversation list, newest first, with the active one marked.
    pub fn conversation_list(
        conversations: &[Conversation],
        active: Option<&ConversationId>,
    ) -> String {
        if conversations.is_empty() {
            return format!("{}\n  (no conversations yet, /new starts one)\n", "Chats".bold());
        }

        let mut output = format!("{}\n", "Chats".bold());
        for (i, conversation) in conversations.iter().enumerate() {
            let marker = if Some(&conversation.id) == active {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            output.push_str(&format!(
                "{} {:>2}. {} {}\n",
                marker,
                i + 1,
                conversation.title,
                conversation
                    .created_at
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
                    .dimmed()
            ));
        }
        output
    }

    /// The command menu opened by a lone `/`.
    pub fn command_menu() -> String {
        format!(
            "{}\n  {}  Search Online (next line becomes a web search)\n  {}  Close this menu\n",
            "Commands".bold(),
            "search".cyan(),
            "<anything else>".dimmed()
        )
    }

    /// Status line for a session state change.
    pub fn session_status(state: SessionState, identity: Option<&Identity>) -> String {
        match (state, identity) {
            (SessionState::Unauthenticated, _) => {
                format!("{} /login, /register or /google", "Signed out.".yellow())
            }
            (SessionState::AuthPending, _) => "Waiting for sign-in to complete...".dimmed().to_string(),
            (SessionState::AuthenticatedNoConversation, Some(identity)) => format!(
                "{} {}. /new starts a conversation.",
                "Signed in as".green(),
                identity.display_name()
            ),
            (SessionState::AuthenticatedNoConversation, None) => {
                "/new starts a conversation.".to_string()
            }
            (SessionState::AuthenticatedWithConversation, _) => String::new(),
        }
    }

    pub fn alert(message: &str) -> String {
        format!("{} {}", "!".red().bold(), message.red())
    }

    pub fn help() -> String {
        let rows = [
            ("/", "Open the command menu"),
            ("/search [query]", "Search the web (with a query: right away)"),
            ("/cancel", "Leave search mode"),
            ("/new", "Start a new conversation"),
            ("/chats, /menu", "List your conversations"),
            ("/open <n>", "Open conversation number n"),
            ("/login <email> <password>", "Sign in with e-mail"),
            ("/register <email> <password>", "Create an account"),
            ("/google", "Sign in with Google"),
            ("/logout", "Sign out"),
            ("/voice", "Toggle voice input"),
            ("/help", "Show this help"),
            ("/quit", "Exit"),
        ];
        let mut output = format!("{}\n", "Commands:".bold());
        for (command, description) in rows {
            output.push_str(&format!("  {:<30} {}\n", command.cyan(), description));
        }
        output
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}", title.cyan().bold(), "-".repeat(40))
    }
}
