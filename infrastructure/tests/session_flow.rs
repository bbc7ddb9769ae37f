//! End-to-end session flow over the real adapters
//!
//! HTTP backend against a mock server, chat store and local auth, in memory
//! or backed by files.

use logangpt_application::{ConversationSessionController, SessionConfig, UiEvent};
use logangpt_domain::{AuthFlow, FALLBACK_REPLY, InputMode, Sender, SessionState};
use logangpt_infrastructure::{HttpAssistantBackend, InMemoryChatStore, LocalAuthProvider};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn assistant_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "2+2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "4" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_json(json!({ "query": "weather today" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Sunny" })))
        .mount(&server)
        .await;
    server
}

fn controller(
    server: &MockServer,
    store: Arc<InMemoryChatStore>,
    auth: Arc<LocalAuthProvider>,
) -> (ConversationSessionController, mpsc::UnboundedReceiver<UiEvent>) {
    let backend = HttpAssistantBackend::new(server.uri(), None).unwrap();
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let controller = ConversationSessionController::new(Arc::new(backend), SessionConfig::default())
        .with_auth_provider(auth)
        .with_chat_store(store)
        .with_ui_events(ui_tx);
    (controller, ui_rx)
}

#[tokio::test]
async fn persisted_conversation_round_trip() {
    let server = assistant_server().await;
    let store = Arc::new(InMemoryChatStore::new());
    let auth = Arc::new(LocalAuthProvider::new().with_hash_cost(4));
    let (mut session, _ui) = controller(&server, store.clone(), auth.clone());

    session.startup().await;
    assert_eq!(session.state(), SessionState::Unauthenticated);

    session
        .register_with_email("logan@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::AuthenticatedNoConversation);

    let id = session.create_conversation().await.unwrap();
    session.send_message("2+2").await.unwrap();

    session.on_input_changed("/");
    assert_eq!(session.input_mode(), InputMode::CommandMenu);
    session.activate_search();
    session.on_input_changed("weather today");
    session.submit().await.unwrap();

    let messages: Vec<_> = session
        .messages()
        .iter()
        .map(|m| (m.text.as_str(), m.sender, m.is_web_result))
        .collect();
    assert_eq!(
        messages,
        vec![
            ("2+2", Sender::User, false),
            ("4", Sender::Bot, false),
            ("weather today", Sender::User, false),
            ("Sunny", Sender::Bot, true),
        ]
    );
    assert_eq!(session.active_conversation().unwrap().title, "2+2");
    assert_eq!(session.input_mode(), InputMode::Normal);

    // Sign out and back in: the conversation comes back as the active one.
    session.logout().await.unwrap();
    assert!(session.messages().is_empty());

    session
        .sign_in_with_email("logan@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(session.active_conversation_id(), Some(&id));
    assert_eq!(session.messages().len(), 4);
}

#[tokio::test]
async fn unknown_prompt_gets_fallback_reply() {
    let server = assistant_server().await;
    let (mut session, _ui) = controller(
        &server,
        Arc::new(InMemoryChatStore::new()),
        Arc::new(LocalAuthProvider::new().with_hash_cost(4)),
    );
    session.startup().await;
    session
        .register_with_email("logan@example.com", "hunter22")
        .await
        .unwrap();
    session.create_conversation().await.unwrap();

    // No mock matches this body, so the server answers 404.
    session.send_message("hello?").await.unwrap();

    assert_eq!(
        session.messages().last().map(|m| m.text.as_str()),
        Some(FALLBACK_REPLY)
    );
}

#[tokio::test]
async fn local_only_session_needs_no_sign_in() {
    let server = assistant_server().await;
    let backend = HttpAssistantBackend::new(server.uri(), None).unwrap();
    let mut session = ConversationSessionController::new(Arc::new(backend), SessionConfig::local());
    session.startup().await;

    session.send_message("2+2").await.unwrap();

    let texts: Vec<_> = session.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Hello! I am LoganGPT. Type / to search online.", "2+2", "4"]
    );
}

#[tokio::test]
async fn saved_accounts_and_chats_survive_restart() {
    let server = assistant_server().await;
    let dir = tempfile::tempdir().unwrap();
    let chats = dir.path().join("chats.json");
    let accounts = dir.path().join("chats.accounts.json");

    let id = {
        let store = Arc::new(InMemoryChatStore::open(&chats).await.unwrap());
        let auth = Arc::new(LocalAuthProvider::open(&accounts).await.unwrap().with_hash_cost(4));
        let (mut session, _ui) = controller(&server, store, auth);
        session.startup().await;
        session
            .register_with_email("logan@example.com", "hunter22")
            .await
            .unwrap();
        let id = session.create_conversation().await.unwrap();
        session.send_message("2+2").await.unwrap();
        id
    };

    let store = Arc::new(InMemoryChatStore::open(&chats).await.unwrap());
    let auth = Arc::new(LocalAuthProvider::open(&accounts).await.unwrap().with_hash_cost(4));
    let (mut session, _ui) = controller(&server, store, auth);
    session.startup().await;

    // The address is taken, so nobody can claim the saved chats by re-registering.
    assert!(
        session
            .register_with_email("logan@example.com", "different1")
            .await
            .is_err()
    );
    session
        .sign_in_with_email("logan@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(session.active_conversation_id(), Some(&id));
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn redirect_sign_in_with_configured_google_account() {
    let server = assistant_server().await;
    let backend = HttpAssistantBackend::new(server.uri(), None).unwrap();
    let auth = LocalAuthProvider::new()
        .with_federated_account("logan@gmail.com")
        .unwrap();
    let mut session = ConversationSessionController::new(
        Arc::new(backend),
        SessionConfig::default().with_auth_flow(AuthFlow::Redirect),
    )
    .with_auth_provider(Arc::new(auth))
    .with_chat_store(Arc::new(InMemoryChatStore::new()));
    session.startup().await;

    session.sign_in_with_google().await.unwrap();
    assert_eq!(session.state(), SessionState::AuthPending);

    session.consume_redirect_result().await;
    assert_eq!(session.state(), SessionState::AuthenticatedNoConversation);
    assert_eq!(
        session.identity().and_then(|i| i.email.as_deref()),
        Some("logan@gmail.com")
    );
}
