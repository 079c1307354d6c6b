//! Integration tests for the dispatch pipeline and idle-session eviction.
//!
//! Flow under test:
//! 1. Several producers push messages into the inbound channel concurrently
//! 2. The dispatcher fans them out to per-user workers
//! 3. Completed answers arrive on the completion channel
//! 4. The reaper evicts sessions that went quiet

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, watch};

use chatflow::adapters::{InMemorySessionStore, RecordingSender};
use chatflow::application::{
    DispatchSummary, Dispatcher, SessionReaper, TurnOutcome, WorkflowController,
};
use chatflow::config::DispatchConfig;
use chatflow::domain::foundation::{Timestamp, UserId};
use chatflow::domain::message::{InboundMessage, Keyboard};
use chatflow::domain::session::UserInputs;
use chatflow::domain::workflow::{CancelButton, Step, WorkflowBuilder};
use chatflow::ports::SessionStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

async fn survey_controller(store: Arc<InMemorySessionStore>) -> Arc<WorkflowController> {
    let mut wf = WorkflowBuilder::new("Survey", "survey");
    let colour = wf.step(
        Step::new("Colour", "colour", "Favourite colour?")
            .with_keyboard(Keyboard::new().row(["Red", "Green", "Blue"]).row(["RESET"])),
    );
    let size = wf.step(
        Step::new("Size", "size", "Size?")
            .with_keyboard(Keyboard::new().row(["S", "M", "L"]).row(["RESET"])),
    );
    let done = wf.step(Step::new("Done", "", "Thanks"));
    wf.connect(colour, size)
        .connect(size, done)
        .cancel_button(CancelButton::new("RESET", "Cleared"));

    let controller = WorkflowController::new("survey-bot", store);
    controller.register(wf.build().unwrap()).await;
    Arc::new(controller)
}

fn script_for(user: i64) -> Vec<InboundMessage> {
    let colour = ["Red", "Green", "Blue"][(user % 3) as usize];
    let size = ["S", "M", "L"][(user % 3) as usize];
    ["/survey", colour, size]
        .into_iter()
        .enumerate()
        .map(|(i, text)| InboundMessage::new(user * 100 + i as i64, user, user, text))
        .collect()
}

fn drain(rx: &mut mpsc::Receiver<UserInputs>) -> Vec<UserInputs> {
    let mut out = Vec::new();
    while let Ok(inputs) = rx.try_recv() {
        out.push(inputs);
    }
    out.sort_by_key(|inputs| inputs.user_id());
    out
}

// =============================================================================
// Dispatch
// =============================================================================

#[tokio::test]
async fn concurrent_producers_complete_every_user_in_order() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = RecordingSender::new().with_delay(Duration::from_millis(1));
    let config = DispatchConfig {
        max_concurrent_turns: 4,
        inbound_buffer: 8,
        user_queue: 2,
    };
    let (done_tx, mut done_rx) = mpsc::channel(32);
    let dispatcher = Dispatcher::new(
        survey_controller(store.clone()).await,
        Arc::new(sender.clone()),
        &config,
    )
    .with_completions(done_tx);

    let (tx, rx) = mpsc::channel(config.inbound_buffer);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let pump = tokio::spawn(dispatcher.run(rx, shutdown_rx));

    let users: Vec<i64> = (1..=12).collect();
    join_all(users.iter().map(|&user| {
        let tx = tx.clone();
        async move {
            for message in script_for(user) {
                tx.send(message).await.unwrap();
            }
        }
    }))
    .await;
    drop(tx);

    let summary = pump.await.unwrap();
    assert_eq!(
        summary,
        DispatchSummary {
            dispatched: 36,
            completed: 12
        }
    );

    let completed = drain(&mut done_rx);
    assert_eq!(completed.len(), 12);
    for inputs in &completed {
        let user = inputs.user_id().value();
        assert_eq!(inputs.get("colour"), Some(["Red", "Green", "Blue"][(user % 3) as usize]));
        assert_eq!(inputs.get("size"), Some(["S", "M", "L"][(user % 3) as usize]));
    }

    for &user in &users {
        let texts: Vec<String> = sender
            .sent_to(UserId::new(user))
            .await
            .into_iter()
            .map(|reply| reply.text)
            .collect();
        assert_eq!(texts, vec!["Favourite colour?", "Size?", "Thanks"]);
    }
    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn cancelled_and_rejected_runs_are_not_reported() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = RecordingSender::new();
    let (done_tx, mut done_rx) = mpsc::channel(8);
    let dispatcher = Dispatcher::new(
        survey_controller(store.clone()).await,
        Arc::new(sender.clone()),
        &DispatchConfig::default(),
    )
    .with_completions(done_tx);

    let (tx, rx) = mpsc::channel(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    for (i, (user, text)) in [
        (1, "/survey"),
        (2, "/survey"),
        (1, "Purple"),
        (2, "Red"),
        (2, "RESET"),
        (1, "Blue"),
    ]
    .into_iter()
    .enumerate()
    {
        tx.send(InboundMessage::new(i as i64, user, user, text))
            .await
            .unwrap();
    }
    drop(tx);

    let summary = dispatcher.run(rx, shutdown_rx).await;

    assert_eq!(summary.dispatched, 6);
    assert_eq!(summary.completed, 0);
    assert!(drain(&mut done_rx).is_empty());
    assert_eq!(store.users().await, vec![UserId::new(1)]);

    let user2 = sender.sent_to(UserId::new(2)).await;
    assert_eq!(user2.last().map(|r| r.text.as_str()), Some("Cleared"));
}

// =============================================================================
// Eviction
// =============================================================================

#[tokio::test]
async fn evicted_session_no_longer_accepts_answers() {
    let store = Arc::new(InMemorySessionStore::new());
    let controller = survey_controller(store.clone()).await;
    let sender = RecordingSender::new();
    controller
        .execute(&InboundMessage::new(1, 5, 5, "/survey"), &sender)
        .await;

    let reaper = SessionReaper::new(
        store.clone(),
        controller.gate().clone(),
        Duration::from_secs(30),
        Duration::from_secs(5),
    );
    let evicted = reaper
        .sweep_at(Timestamp::now().plus_secs(31))
        .await
        .unwrap();

    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].user_id(), UserId::new(5));
    assert_eq!(store.len().await.unwrap(), 0);

    let outcome = controller
        .execute(&InboundMessage::new(2, 5, 5, "Red"), &sender)
        .await;
    assert_eq!(outcome, TurnOutcome::Unrecognized);
}

#[tokio::test]
async fn recent_sessions_survive_a_sweep() {
    let store = Arc::new(InMemorySessionStore::new());
    let controller = survey_controller(store.clone()).await;
    let sender = RecordingSender::new();
    controller
        .execute(&InboundMessage::new(1, 6, 6, "/survey"), &sender)
        .await;

    let reaper = SessionReaper::new(
        store.clone(),
        controller.gate().clone(),
        Duration::from_secs(30),
        Duration::from_secs(5),
    );
    let evicted = reaper.sweep_at(Timestamp::now().plus_secs(10)).await.unwrap();

    assert!(evicted.is_empty());
    assert!(controller.session(UserId::new(6)).await.is_some());
}
