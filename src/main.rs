use std::{process, sync::Arc, time::Duration};

use serde_json::json;
use taggr_client::{
    application::{
        backend::TimedBackend,
        error::{ClientError, ErrorReport},
        events::EventKind,
        shell::Shell,
    },
    config::{self, Command, Settings},
    infra::{http::HttpBackend, telemetry},
    router::{Renderer, RoutedView, Router},
};
use time::format_description::well_known::Rfc3339;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const EVENT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &ClientError) {
    let report = ErrorReport::from_error("main::run", error);
    if dispatcher::has_been_set() {
        log_report(&report);
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || log_report(&report));
}

fn log_report(report: &ErrorReport) {
    error!(
        source = report.source,
        error = %report.chain(),
        "application error"
    );
}

async fn run() -> Result<(), ClientError> {
    let (cli_args, settings) = config::load_with_cli()?;
    let command = cli_args.command.unwrap_or(Command::Watch);

    telemetry::init(&settings.logging)?;

    let shell = Arc::new(build_shell(&settings).await?);
    shell.start().await?;

    match command {
        Command::Watch => run_watch(shell).await,
        Command::Snapshot => print_snapshot(&shell),
        Command::Route(args) => print_route(&shell, &settings, &args.hash),
    }
}

async fn build_shell(settings: &Settings) -> Result<Shell, ClientError> {
    let http = HttpBackend::from_settings(&settings.backend).await?;
    info!(
        backend = %http.base(),
        timeout_ms = settings.backend.request_timeout.as_millis(),
        "Backend configured"
    );
    let backend = TimedBackend::new(http, settings.backend.request_timeout);
    Ok(Shell::new(Arc::new(backend), settings))
}

async fn run_watch(shell: Arc<Shell>) -> Result<(), ClientError> {
    let refresh_handle = shell.spawn_refresh_loop();
    let mut poll = tokio::time::interval(EVENT_POLL_INTERVAL);

    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                break signal.map_err(|err| {
                    ClientError::unexpected(format!("failed to listen for ctrl-c: {err}"))
                });
            }
            _ = poll.tick() => {
                for event in shell.events().drain() {
                    match event.kind {
                        EventKind::UpgradeAvailable { marker } => {
                            info!(
                                epoch = event.epoch,
                                %marker,
                                "New backend release available; reload to upgrade"
                            );
                        }
                        EventKind::RefreshFailed { warning } => {
                            warn!(epoch = event.epoch, %warning, "Serving stale reference data");
                        }
                        EventKind::Alert { message } => {
                            warn!(epoch = event.epoch, %message, "Alert");
                        }
                    }
                }
            }
        }
    };

    info!("Shutting down");
    refresh_handle.abort();
    let _ = refresh_handle.await;
    result
}

fn print_snapshot(shell: &Shell) -> Result<(), ClientError> {
    let snapshot = shell.snapshot();
    let summary = json!({
        "fetched_at": snapshot.fetched_at.and_then(|at| at.format(&Rfc3339).ok()),
        "users": snapshot.users.len(),
        "recent_tags": snapshot.recent_tags.iter().take(10).collect::<Vec<_>>(),
        "realms": snapshot.realms.keys().collect::<Vec<_>>(),
        "stats": snapshot.stats,
        "session": shell.session().as_deref(),
        "last_visit": shell.last_visit(),
    });
    print_json(&summary)
}

/// Renders a route to its own descriptor, for printing.
struct DescribeRenderer;

impl Renderer for DescribeRenderer {
    type View = RoutedView;

    fn render(&mut self, route: &RoutedView) -> Self::View {
        route.clone()
    }
}

fn print_route(shell: &Shell, settings: &Settings, hash: &str) -> Result<(), ClientError> {
    let mut router = Router::new(DescribeRenderer, settings.router);
    shell.navigate(&mut router, hash);
    let page = router
        .current()
        .ok_or_else(|| ClientError::unexpected(format!("no view for `{hash}`")))?;
    print_json(&page.view)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), ClientError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| ClientError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{text}");
    Ok(())
}
