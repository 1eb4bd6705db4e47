use super::*;
use crate::backend::{BackendError, MockBackend};
use crate::dispatcher::{DispatchPhase, SubmitOutcome};
use crate::navigation::BLOCKED_NOTICE;
use crate::tools::{ToolKind, ToolRequest};
use crate::transcript::{Author, Block};

fn quick_mock() -> MockBackend {
    MockBackend::new().with_delay(Duration::from_millis(5))
}

fn dispatched(outcome: SubmitOutcome) -> EntryId {
    match outcome {
        SubmitOutcome::Dispatched(id) => id,
        other => panic!("Expected a dispatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fallback_hits_only_chat_with_verbatim_text() {
    let mock = Arc::new(quick_mock());
    let (mut dispatcher, mut receiver) =
        setup_dispatcher(mock.clone(), Arc::new(RecordingNavigator::default()), &test_config());

    let line = "What is a   Phishing kit?";
    let entry = dispatched(dispatcher.submit(&format!("  {}  ", line)));
    assert!(!dispatcher.submit_enabled());
    assert_eq!(dispatcher.phase(), DispatchPhase::Sending);

    assert_eq!(settle_next(&mut dispatcher, &mut receiver).await, entry);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        ToolRequest::Chat { message, user_id } => {
            assert_eq!(message, line);
            assert!(user_id.starts_with("user_"));
        }
        other => panic!("Expected chat request, got {:?}", other),
    }

    let settled = dispatcher.transcript().get(entry).unwrap();
    assert_eq!(settled.author, Author::Tool(ToolKind::Chat));
    assert_eq!(settled.blocks, vec![Block::Text(format!("Response to: {}", line))]);
    assert!(dispatcher.submit_enabled());
    assert_eq!(dispatcher.phase(), DispatchPhase::Idle);
}

#[tokio::test]
async fn test_empty_password_is_a_usage_error_without_network() {
    let mock = Arc::new(quick_mock());
    let (mut dispatcher, _receiver) =
        setup_dispatcher(mock.clone(), Arc::new(RecordingNavigator::default()), &test_config());

    let outcome = dispatcher.submit("check password ");
    let SubmitOutcome::UsageError(id) = outcome else {
        panic!("Expected usage error, got {:?}", outcome);
    };

    let entry = dispatcher.transcript().get(id).unwrap();
    assert_eq!(entry.author, Author::Tool(ToolKind::Password));
    assert_eq!(entry.to_plain_text(), "🔐 Tool: Usage: check password yourpassword");
    assert!(mock.calls().is_empty());
    assert!(dispatcher.submit_enabled());
    assert_eq!(dispatcher.in_flight(), 0);
    assert!(!dispatcher.transcript().entries().iter().any(|e| e.is_pending()));
}

#[tokio::test]
async fn test_whitespace_is_ignored() {
    let (mut dispatcher, _receiver) = setup_dispatcher(
        Arc::new(quick_mock()),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );
    assert_eq!(dispatcher.submit("   \t "), SubmitOutcome::Ignored);
    assert!(dispatcher.transcript().is_empty());
}

#[tokio::test]
async fn test_password_secret_is_sent_but_never_shown() {
    let mock = Arc::new(quick_mock());
    let (mut dispatcher, mut receiver) =
        setup_dispatcher(mock.clone(), Arc::new(RecordingNavigator::default()), &test_config());

    dispatched(dispatcher.submit("check password Hunter2!"));
    assert_eq!(
        dispatcher.transcript().entries()[0].to_plain_text(),
        "user@hostname:~$ check password ********"
    );
    settle_next(&mut dispatcher, &mut receiver).await;

    assert_eq!(
        mock.calls(),
        vec![ToolRequest::CheckPassword {
            password: "Hunter2!".to_string()
        }]
    );
    assert!(!dispatcher.transcript().to_plain_text().contains("Hunter2!"));
}

#[tokio::test]
async fn test_compromised_email_lists_breaches() {
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(quick_mock()),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );

    dispatched(dispatcher.submit("check email pwned@example.com"));
    settle_next(&mut dispatcher, &mut receiver).await;

    let text = dispatcher.transcript().to_plain_text();
    assert!(text.contains("Breaches found: 2"));
    assert!(text.contains("Adobe"));
    assert!(text.contains("LinkedIn"));
}

#[tokio::test]
async fn test_out_of_order_results_land_in_their_own_placeholders() {
    let mock = quick_mock()
        .with_delay_for(ToolKind::News, Duration::from_millis(200))
        .with_delay_for(ToolKind::Email, Duration::from_millis(5));
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(mock),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );

    let news = dispatched(dispatcher.submit("security news"));
    let email = dispatched(dispatcher.submit("check email someone@example.com"));
    assert_eq!(dispatcher.in_flight(), 2);

    assert_eq!(settle_next(&mut dispatcher, &mut receiver).await, email);
    assert!(dispatcher.transcript().get(news).unwrap().is_pending());
    assert_eq!(
        dispatcher.transcript().get(email).unwrap().author,
        Author::Tool(ToolKind::Email)
    );
    assert_eq!(dispatcher.phase(), DispatchPhase::Sending);

    assert_eq!(settle_next(&mut dispatcher, &mut receiver).await, news);
    assert_eq!(
        dispatcher.transcript().get(news).unwrap().author,
        Author::Tool(ToolKind::News)
    );
    assert_eq!(
        dispatcher.transcript().get(email).unwrap().author,
        Author::Tool(ToolKind::Email)
    );
    assert_eq!(dispatcher.phase(), DispatchPhase::Idle);

    // user line, placeholder, user line, placeholder
    let authors: Vec<Author> = dispatcher.transcript().entries().iter().map(|e| e.author).collect();
    assert_eq!(
        authors,
        vec![
            Author::User,
            Author::Tool(ToolKind::News),
            Author::User,
            Author::Tool(ToolKind::Email),
        ]
    );
}

#[tokio::test]
async fn test_timeout_settles_and_reenables_submit() {
    let config = Config {
        request_timeout: Duration::from_millis(50),
        ..test_config()
    };
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(MockBackend::new().with_delay(Duration::from_secs(10))),
        Arc::new(RecordingNavigator::default()),
        &config,
    );

    let entry = dispatched(dispatcher.submit("hello"));
    settle_next(&mut dispatcher, &mut receiver).await;

    let settled = dispatcher.transcript().get(entry).unwrap();
    assert_eq!(settled.author, Author::Error);
    assert!(settled.to_plain_text().contains("timed out"));
    assert!(dispatcher.submit_enabled());
}

#[tokio::test]
async fn test_cancel_in_flight() {
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(MockBackend::new().with_delay(Duration::from_secs(10))),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );

    let entry = dispatched(dispatcher.submit("security news"));
    assert_eq!(dispatcher.cancel_in_flight(), 1);
    settle_next(&mut dispatcher, &mut receiver).await;

    assert_eq!(
        dispatcher.transcript().get(entry).unwrap().to_plain_text(),
        "❌ Error: request cancelled"
    );
    assert_eq!(dispatcher.in_flight(), 0);
}

#[tokio::test]
async fn test_transport_failure_renders_error() {
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(quick_mock()),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );

    let entry = dispatched(dispatcher.submit("network error"));
    settle_next(&mut dispatcher, &mut receiver).await;

    assert_eq!(
        dispatcher.transcript().get(entry).unwrap().to_plain_text(),
        "❌ Error: Network error: Simulated network failure"
    );
}

#[tokio::test]
async fn test_scripted_status_error() {
    let mock = quick_mock().with_response(ToolKind::News, Err(BackendError::Status { status: 503 }));
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(mock),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );

    let entry = dispatched(dispatcher.submit("hacker news"));
    settle_next(&mut dispatcher, &mut receiver).await;
    assert_eq!(
        dispatcher.transcript().get(entry).unwrap().to_plain_text(),
        "❌ Error: HTTP error! status: 503"
    );
}

#[tokio::test]
async fn test_surveillance_opens_link_after_delay() {
    let navigator = Arc::new(RecordingNavigator::default());
    let (mut dispatcher, mut receiver) =
        setup_dispatcher(Arc::new(quick_mock()), navigator.clone(), &test_config());

    let entry = dispatched(dispatcher.submit("show me surveillance"));
    settle_next(&mut dispatcher, &mut receiver).await;
    assert!(navigator.opened().is_empty());

    let (navigated, url) = navigate_next(&mut dispatcher, &mut receiver).await;
    assert_eq!(navigated, entry);
    assert_eq!(navigator.opened(), vec![url.clone()]);
    assert!(url.starts_with("http://www.insecam.org/"));

    let blocks = &dispatcher.transcript().get(entry).unwrap().blocks;
    assert!(!blocks.iter().any(|b| matches!(b, Block::Notice(_))));
    assert_eq!(blocks[0].links(), vec![url.as_str()]);
}

#[tokio::test]
async fn test_blocked_navigation_appends_notice() {
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(quick_mock()),
        Arc::new(RecordingNavigator::failing()),
        &test_config(),
    );

    let entry = dispatched(dispatcher.submit("surveillance"));
    navigate_next(&mut dispatcher, &mut receiver).await;

    let blocks = &dispatcher.transcript().get(entry).unwrap().blocks;
    assert_eq!(blocks.last(), Some(&Block::Notice(BLOCKED_NOTICE.to_string())));
}

#[tokio::test]
async fn test_search_sends_whole_line_to_chat() {
    let mock = Arc::new(quick_mock());
    let (mut dispatcher, mut receiver) =
        setup_dispatcher(mock.clone(), Arc::new(RecordingNavigator::default()), &test_config());

    let entry = dispatched(dispatcher.submit("search Jane Doe"));
    settle_next(&mut dispatcher, &mut receiver).await;

    assert!(matches!(
        &mock.calls()[0],
        ToolRequest::Search { message, .. } if message == "search Jane Doe"
    ));
    let settled = dispatcher.transcript().get(entry).unwrap();
    assert_eq!(settled.author, Author::Tool(ToolKind::Osint));
    assert!(matches!(&settled.blocks[0], Block::Headline(h) if h.starts_with("PUBLICITY SCORE")));
}

#[tokio::test]
async fn test_session_identifier_is_stable_until_new_session() {
    let mock = Arc::new(quick_mock());
    let (mut dispatcher, mut receiver) =
        setup_dispatcher(mock.clone(), Arc::new(RecordingNavigator::default()), &test_config());

    dispatched(dispatcher.submit("hi"));
    settle_next(&mut dispatcher, &mut receiver).await;
    dispatched(dispatcher.recall_memory());
    settle_next(&mut dispatcher, &mut receiver).await;

    tokio::time::sleep(Duration::from_millis(5)).await;
    dispatcher.new_session();
    assert_eq!(dispatcher.transcript().len(), 1);

    dispatched(dispatcher.forget_memory());
    settle_next(&mut dispatcher, &mut receiver).await;

    let ids: Vec<String> = mock
        .calls()
        .into_iter()
        .map(|call| match call {
            ToolRequest::Chat { user_id, .. }
            | ToolRequest::UserMemory { user_id }
            | ToolRequest::ClearMemory { user_id } => user_id,
            other => panic!("unexpected call {:?}", other),
        })
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
}

#[tokio::test]
async fn test_results_for_cleared_session_are_dropped() {
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(MockBackend::new().with_delay(Duration::from_secs(10))),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );

    dispatched(dispatcher.submit("hello"));
    dispatcher.new_session();
    assert!(dispatcher.submit_enabled());

    settle_next(&mut dispatcher, &mut receiver).await;
    assert_eq!(dispatcher.transcript().len(), 1);
    assert_eq!(dispatcher.transcript().entries()[0].author, Author::System);
}

#[tokio::test]
async fn test_stale_result_keeps_submit_disabled_for_newer_request() {
    let (mut dispatcher, mut receiver) = setup_dispatcher(
        Arc::new(MockBackend::new().with_delay(Duration::from_secs(10))),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );

    let stale = dispatched(dispatcher.submit("hello"));
    dispatcher.new_session();
    let current = dispatched(dispatcher.submit("second"));

    // the cancelled request from the old session settles first
    assert_eq!(settle_next(&mut dispatcher, &mut receiver).await, stale);
    assert_eq!(dispatcher.in_flight(), 1);
    assert!(!dispatcher.submit_enabled());
    assert_eq!(dispatcher.phase(), DispatchPhase::Sending);
    assert!(dispatcher.transcript().get(current).unwrap().is_pending());

    dispatcher.cancel_in_flight();
    assert_eq!(settle_next(&mut dispatcher, &mut receiver).await, current);
    assert!(dispatcher.submit_enabled());
    assert_eq!(dispatcher.phase(), DispatchPhase::Idle);
    assert_eq!(dispatcher.transcript().get(current).unwrap().author, Author::Error);
}

#[tokio::test]
async fn test_bare_search_with_trailing_space_goes_to_chat() {
    let mock = Arc::new(quick_mock());
    let (mut dispatcher, mut receiver) =
        setup_dispatcher(mock.clone(), Arc::new(RecordingNavigator::default()), &test_config());

    // trimming leaves "search", which has no argument separator
    let entry = dispatched(dispatcher.submit("search   "));
    settle_next(&mut dispatcher, &mut receiver).await;

    match mock.calls().as_slice() {
        [ToolRequest::Chat { message, .. }] => assert_eq!(message, "search"),
        other => panic!("Expected one chat request, got {:?}", other),
    }
    assert_eq!(
        dispatcher.transcript().get(entry).unwrap().author,
        Author::Tool(ToolKind::Chat)
    );
}

#[tokio::test]
async fn test_help_lists_tool_commands() {
    let (mut dispatcher, _receiver) = setup_dispatcher(
        Arc::new(quick_mock()),
        Arc::new(RecordingNavigator::default()),
        &test_config(),
    );
    dispatcher.help();
    let text = dispatcher.transcript().to_plain_text();
    for command in ["check password", "check email", "security news", "surveillance", "search"] {
        assert!(text.contains(command), "help is missing {}", command);
    }
}

#[tokio::test]
async fn test_open_last_link_without_links() {
    let navigator = Arc::new(RecordingNavigator::default());
    let (mut dispatcher, _receiver) =
        setup_dispatcher(Arc::new(quick_mock()), navigator.clone(), &test_config());
    dispatcher.open_last_link();
    assert!(navigator.opened().is_empty());
    assert_eq!(dispatcher.transcript().len(), 1);
}
