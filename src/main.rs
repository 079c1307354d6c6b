//! Console demo: an air-conditioner control bot driven from stdin.
//!
//! Every line is a message from console user 1. Prefix a line with `@<id>`
//! to speak as another user, e.g. `@2 /ac_control`. Completed workflows are
//! printed as JSON.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::info;

use chatflow::adapters::{telemetry, ConsoleSender, InMemorySessionStore};
use chatflow::application::{Dispatcher, SessionReaper, WorkflowController};
use chatflow::config::AppConfig;
use chatflow::domain::foundation::DomainError;
use chatflow::domain::message::{InboundMessage, Keyboard};
use chatflow::domain::session::UserInputs;
use chatflow::domain::workflow::{CancelButton, LiteralBranch, Step, Workflow, WorkflowBuilder};
use chatflow::ports::{MessageSender, SessionStore};

const CONSOLE_USER: i64 = 1;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;
    let _log = telemetry::init(&config.logging)?;

    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let controller = Arc::new(WorkflowController::from_config(&config.engine, store));
    controller.register(ac_control_workflow()?).await;

    let sender: Arc<dyn MessageSender> = Arc::new(ConsoleSender::stdout());
    let (inbound_tx, inbound_rx) = mpsc::channel(config.dispatch.inbound_buffer);
    let (completed_tx, mut completed_rx) = mpsc::channel::<UserInputs>(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reaper = SessionReaper::from_config(&controller, &config.sessions).map(|reaper| {
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { reaper.run(shutdown).await })
    });

    let dispatcher =
        Dispatcher::new(controller, sender, &config.dispatch).with_completions(completed_tx);
    let pump = tokio::spawn(dispatcher.run(inbound_rx, shutdown_rx.clone()));

    let printer = tokio::spawn(async move {
        while let Some(inputs) = completed_rx.recv().await {
            match serde_json::to_string(&inputs) {
                Ok(json) => println!("done> {}", json),
                Err(e) => eprintln!("cannot print answers: {}", e),
            }
        }
    });

    println!("Type /ac_control to start, RESET to cancel, Ctrl-D to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut message_id = 0;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        message_id += 1;
        if inbound_tx.send(parse_line(message_id, &line)).await.is_err() {
            break;
        }
    }

    drop(inbound_tx);
    let summary = pump.await?;
    let _ = shutdown_tx.send(true);
    if let Some(reaper) = reaper {
        reaper.await?;
    }
    printer.await?;

    info!(
        dispatched = summary.dispatched,
        completed = summary.completed,
        "console session over"
    );
    Ok(())
}

/// Turns `@<id> text` into a message from user `<id>`, anything else into a
/// message from the console user.
fn parse_line(message_id: i64, line: &str) -> InboundMessage {
    let (user, text) = line
        .strip_prefix('@')
        .and_then(|rest| rest.split_once(' '))
        .and_then(|(id, text)| id.parse::<i64>().ok().map(|id| (id, text)))
        .unwrap_or((CONSOLE_USER, line));
    InboundMessage::new(message_id, user, user, text.trim()).with_username(format!("console{}", user))
}

/// Air conditioner control: pick a unit, then quick start it, turn it off,
/// or walk through temperature, fan speed and confirmation.
fn ac_control_workflow() -> Result<Workflow, DomainError> {
    let mut wf = WorkflowBuilder::new("WF1", "ac_control");

    let name = wf.step(
        Step::new("AC Name", "ACName", "Please select an AC to control").with_keyboard(
            Keyboard::new()
                .row(["Main Hall", "Bedroom 1", "Bedroom 2"])
                .row(["RESET"]),
        ),
    );
    let action = wf.step(
        Step::new("AC Action", "ACAction", "Please select an option").with_keyboard(
            Keyboard::new()
                .row(["Quick Start", "Turn OFF"])
                .row(["Temperature"])
                .row(["RESET"]),
        ),
    );
    let quick_start = wf.step(
        Step::new("Quick Start", "", "Quick Starting AC").with_renderer(|ui: &UserInputs| {
            format!(
                "Starting AC <b>{}</b> with Temp 27 C at Medium fan speed",
                ui.get("ACName").unwrap_or_default()
            )
        }),
    );
    let turn_off = wf.step(
        Step::new("Turn OFF", "", "Turning AC OFF").with_renderer(|ui: &UserInputs| {
            format!("Turning OFF AC <b>{}</b>", ui.get("ACName").unwrap_or_default())
        }),
    );
    let temperature = wf.step(
        Step::new("AC Temperature", "ACTemp", "Please select AC Temperature").with_keyboard(
            Keyboard::new()
                .row(["19 C", "20 C", "21 C", "22 C"])
                .row(["23 C", "24 C", "25 C", "26 C"])
                .row(["RESET"]),
        ),
    );
    let fan = wf.step(
        Step::new("AC Fan Speed", "ACFanSpeed", "Please select the Fan Speed").with_keyboard(
            Keyboard::new()
                .row(["Min", "Med", "Max"])
                .row(["Auto"])
                .row(["RESET"]),
        ),
    );
    let power = wf.step(
        Step::new("AC Power", "ACPower", "Please confirm AC can be turned ON")
            .with_keyboard(Keyboard::new().row(["Turn ON"]).row(["RESET"])),
    );
    let summary = wf.step(
        Step::new("ACLastStep", "", "Starting AC with following Parameters:").with_renderer(
            |ui: &UserInputs| {
                format!(
                    "Starting AC <b>{}</b> with Temp {} and Fan Speed {}",
                    ui.get("ACName").unwrap_or_default(),
                    ui.get("ACTemp").unwrap_or_default(),
                    ui.get("ACFanSpeed").unwrap_or_default()
                )
            },
        ),
    );

    wf.connect(name, action)
        .branch(
            action,
            LiteralBranch::new()
                .route("Quick Start", "QuickStart")
                .route("Turn OFF", "OFF")
                .route("Temperature", "Temp"),
        )
        .branch_to(action, "QuickStart", quick_start)
        .branch_to(action, "OFF", turn_off)
        .branch_to(action, "Temp", temperature)
        .connect(temperature, fan)
        .connect(fan, power)
        .connect(power, summary)
        .cancel_button(CancelButton::new(
            "RESET",
            "Clearing all input. Please start again",
        ));

    Ok(wf.build()?)
}
