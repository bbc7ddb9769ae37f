//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::ReplConfig;
use crate::progress::spinner::ThinkingSpinner;
use logangpt_application::{ConversationSessionController, SessionError, UiEvent};
use logangpt_domain::{AuthFlow, ConversationId, InputMode};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tokio::sync::mpsc;
use tracing::debug;

/// Outcome of one slash command
enum CommandOutcome {
    Continue,
    Quit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    controller: ConversationSessionController,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    config: ReplConfig,
    rendered_conversation: Option<ConversationId>,
    rendered_messages: usize,
}

impl ChatRepl {
    /// Create a new ChatRepl around a controller and its UI event channel
    pub fn new(
        controller: ConversationSessionController,
        ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    ) -> Self {
        Self {
            controller,
            ui_rx,
            config: ReplConfig::default(),
            rendered_conversation: None,
            rendered_messages: 0,
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();
        self.controller.startup().await;
        self.refresh(true).await;

        loop {
            let readline = rl.readline(Self::prompt(self.controller.input_mode()));

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if self.controller.input_mode() == InputMode::CommandMenu {
                        let outcome = self.choose_from_menu(line).await;
                        self.refresh(false).await;
                        if matches!(outcome, CommandOutcome::Quit) {
                            break;
                        }
                        continue;
                    }

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    if line == "/" {
                        self.controller.on_input_changed(line);
                        if self.controller.input_mode() == InputMode::CommandMenu {
                            println!("{}", ConsoleFormatter::command_menu());
                        } else {
                            println!("Already searching. /cancel leaves search mode.");
                        }
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        let outcome = self.handle_command(line).await;
                        self.refresh(false).await;
                        if matches!(outcome, CommandOutcome::Quit) {
                            break;
                        }
                        continue;
                    }

                    // Add to history
                    let _ = rl.add_history_entry(line);

                    self.send(line).await;
                    self.refresh(false).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn prompt(mode: InputMode) -> &'static str {
        match mode {
            InputMode::Normal => "you> ",
            InputMode::CommandMenu => "menu> ",
            InputMode::Search => "search> ",
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│                  LoganGPT                   │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        if !self.controller.config().persistence_enabled {
            println!("Local session: messages are not saved.");
        }
        println!("Type / for the command menu, /help for all commands.");
        println!();
    }

    /// Answer the command menu opened by a lone `/`.
    async fn choose_from_menu(&mut self, line: &str) -> CommandOutcome {
        if line.eq_ignore_ascii_case("search") {
            self.controller.activate_search();
            println!("Search mode. Your next messages are web searches; /cancel to leave.");
            return CommandOutcome::Continue;
        }

        // Any other input closes the menu and is handled as typed.
        self.controller.on_input_changed(line);
        if line.starts_with('/') && line != "/" {
            return self.handle_command(line).await;
        }
        if !line.is_empty() && line != "/" {
            self.send(line).await;
        }
        CommandOutcome::Continue
    }

    /// Send a line through the controller's input buffer.
    async fn send(&mut self, line: &str) {
        if !self.controller.can_send() {
            if self.controller.identity().is_none() {
                println!("Sign in first: /login <email> <password>, /register or /google");
            } else {
                println!("No conversation open. /new starts one.");
            }
            return;
        }

        self.controller.on_input_changed(line);
        let result = {
            let _spinner = ThinkingSpinner::start(self.config.show_progress);
            self.controller.submit().await
        };
        self.report(result);
    }

    /// Handle slash commands.
    async fn handle_command(&mut self, line: &str) -> CommandOutcome {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        debug!("Command {}", command);

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return CommandOutcome::Quit;
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("{}", ConsoleFormatter::help());
            }
            "/search" => {
                if self.controller.input_mode() != InputMode::Search {
                    self.controller.on_input_changed("/");
                    self.controller.activate_search();
                }
                if args.is_empty() {
                    println!("Search mode. Your next messages are web searches; /cancel to leave.");
                } else {
                    let query = args.join(" ");
                    self.send(&query).await;
                }
            }
            "/cancel" => {
                if self.controller.cancel_search() {
                    println!("Search cancelled.");
                }
            }
            "/new" => {
                let result = self.controller.create_conversation().await.map(|_| ());
                self.report(result);
            }
            "/chats" | "/menu" => {
                if command == "/menu" {
                    self.controller.open_side_menu();
                }
                println!(
                    "{}",
                    ConsoleFormatter::conversation_list(
                        self.controller.conversations(),
                        self.controller.active_conversation_id(),
                    )
                );
            }
            "/open" => match args.first().and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n >= 1 => {
                    let id = self
                        .controller
                        .conversations()
                        .get(n - 1)
                        .map(|c| c.id.clone());
                    match id {
                        Some(id) => {
                            let result = self.controller.select_conversation(&id).await;
                            self.report(result);
                        }
                        None => println!("No conversation number {}. /chats lists them.", n),
                    }
                }
                _ => println!("Usage: /open <n>"),
            },
            "/login" | "/register" => {
                let [email, password] = args.as_slice() else {
                    println!("Usage: {} <email> <password>", command);
                    return CommandOutcome::Continue;
                };
                let result = if command == "/login" {
                    self.controller.sign_in_with_email(email, password).await
                } else {
                    self.controller.register_with_email(email, password).await
                };
                self.report(result);
            }
            "/google" => {
                let result = self.controller.sign_in_with_google().await;
                let redirected = result.is_ok()
                    && self.controller.config().auth_flow == AuthFlow::Redirect;
                self.report(result);
                if redirected {
                    println!("Returning from sign-in redirect...");
                    self.controller.consume_redirect_result().await;
                }
            }
            "/logout" => {
                let result = self.controller.logout().await;
                self.report(result);
            }
            "/voice" => {
                let result = self.controller.toggle_voice_input().await;
                self.report(result);
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
            }
        }
        CommandOutcome::Continue
    }

    /// Print errors the controller has not already raised as alerts.
    fn report(&self, result: Result<(), SessionError>) {
        match result {
            Ok(()) => {}
            Err(SessionError::AuthFailure(_)) | Err(SessionError::SpeechUnsupported) => {}
            Err(SessionError::NotAuthenticated) => {
                println!("Sign in first: /login <email> <password>, /register or /google");
            }
            Err(e) => eprintln!("{}", ConsoleFormatter::alert(&e.to_string())),
        }
    }

    /// Apply pending collaborator callbacks, then print what changed.
    async fn refresh(&mut self, initial: bool) {
        self.controller.pump().await;

        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Alert(message) => eprintln!("{}", ConsoleFormatter::alert(&message)),
                UiEvent::SessionChanged(state) => {
                    let status =
                        ConsoleFormatter::session_status(state, self.controller.identity());
                    if !status.is_empty() {
                        println!("{}", status);
                    }
                }
                UiEvent::ListeningChanged(true) => println!("Listening..."),
                UiEvent::InputUpdated { mode, .. } => debug!("Input mode: {}", mode.indicator()),
                _ => {}
            }
        }

        self.render_messages(initial);
    }

    /// Print messages not yet on screen.
    ///
    /// A conversation switch reprints the whole transcript. Within one
    /// conversation only bot replies are printed; the user's own lines are
    /// already visible at the prompt.
    fn render_messages(&mut self, initial: bool) {
        let active = self.controller.active_conversation_id().cloned();
        let messages = self.controller.messages();

        let full = initial
            || active != self.rendered_conversation
            || messages.len() < self.rendered_messages;
        let start = if full { 0 } else { self.rendered_messages };

        let mut lines = Vec::new();
        if full && let Some(conversation) = self.controller.active_conversation() {
            lines.push(ConsoleFormatter::conversation_header(conversation));
        }
        for message in &messages[start..] {
            if full || message.is_bot() {
                lines.push(ConsoleFormatter::message(message));
            }
        }

        self.rendered_conversation = active;
        self.rendered_messages = messages.len();
        for line in lines {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use logangpt_application::{AssistantBackend, BackendError, SessionConfig};
    use std::sync::Arc;

    struct EchoBackend;

    #[async_trait]
    impl AssistantBackend for EchoBackend {
        async fn send(&self, text: &str, is_search_query: bool) -> Result<String, BackendError> {
            Ok(format!("{}:{}", if is_search_query { "search" } else { "chat" }, text))
        }
    }

    fn local_repl() -> ChatRepl {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let controller =
            ConversationSessionController::new(Arc::new(EchoBackend), SessionConfig::local())
                .with_ui_events(ui_tx);
        ChatRepl::new(controller, ui_rx).with_config(ReplConfig {
            show_progress: false,
            history_file: None,
        })
    }

    #[test]
    fn prompt_follows_input_mode() {
        assert_eq!(ChatRepl::prompt(InputMode::Normal), "you> ");
        assert_eq!(ChatRepl::prompt(InputMode::Search), "search> ");
    }

    #[tokio::test]
    async fn search_command_with_query_sends_search() {
        let mut repl = local_repl();

        let outcome = repl.handle_command("/search weather today").await;

        assert!(matches!(outcome, CommandOutcome::Continue));
        let last = repl.controller.messages().last().unwrap();
        assert_eq!(last.text, "search:weather today");
        assert!(last.is_web_result);
        assert_eq!(repl.controller.input_mode(), InputMode::Normal);
    }

    #[tokio::test]
    async fn menu_search_then_line_is_a_search() {
        let mut repl = local_repl();
        repl.controller.on_input_changed("/");

        repl.choose_from_menu("search").await;
        assert_eq!(repl.controller.input_mode(), InputMode::Search);

        repl.send("rust news").await;
        assert_eq!(
            repl.controller.messages().last().map(|m| m.text.as_str()),
            Some("search:rust news")
        );
    }

    #[tokio::test]
    async fn menu_other_text_is_sent_as_chat() {
        let mut repl = local_repl();
        repl.controller.on_input_changed("/");

        repl.choose_from_menu("hello").await;

        assert_eq!(repl.controller.input_mode(), InputMode::Normal);
        assert_eq!(
            repl.controller.messages().last().map(|m| m.text.as_str()),
            Some("chat:hello")
        );
    }

    #[tokio::test]
    async fn quit_from_menu() {
        let mut repl = local_repl();
        repl.controller.on_input_changed("/");
        assert!(matches!(
            repl.choose_from_menu("/quit").await,
            CommandOutcome::Quit
        ));
    }

    #[tokio::test]
    async fn render_tracks_printed_messages() {
        let mut repl = local_repl();
        repl.refresh(true).await;
        assert_eq!(repl.rendered_messages, 1);

        repl.send("hi").await;
        repl.refresh(false).await;
        assert_eq!(repl.rendered_messages, 3);
    }
}
