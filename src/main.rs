#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::anyhow;
use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use domain::services::clipboard::ClipboardService;
use infrastructure::backends::BackendManager;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;
use crate::domain::services::actions::ActionsService;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Natter has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
        eprintln!(
            "\nA debug log is written to {} when running with RUST_LOG=natter",
            cli::log_path().to_string_lossy()
        );
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let log_path = cli::log_path();
    let debug_log_dir = log_path
        .parent()
        .map(|e| return e.to_path_buf())
        .unwrap_or_default();

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("natter")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    match cli::parse().await {
        Ok(true) => {}
        Ok(false) => process::exit(0),
        Err(ready_err) => {
            handle_error(ready_err);
            return;
        }
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    let actions_event_tx = event_tx.clone();
    background_futures.spawn(async move {
        return ActionsService::start(BackendManager::get(), actions_event_tx, &mut action_rx)
            .await;
    });

    if let Err(clipboard_err) = ClipboardService::healthcheck() {
        tracing::warn!(err = ?clipboard_err, "Clipboard service is unable to start")
    } else {
        background_futures.spawn(async move {
            return ClipboardService::start().await;
        });
    }

    let ui_future = ui::start(action_tx, event_tx, event_rx);

    let res: Result<()> = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(join_err)) => Err(anyhow!(join_err)),
            None => Ok(()),
        },
        res = ui_future => res,
    );

    if let Err(err) = res {
        ui::destruct_terminal_for_panic();
        handle_error(err);
    }

    process::exit(0);
}
