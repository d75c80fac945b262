//! Command-line entry point.
//!
//! Connection settings come from `FLEETDECK_*` environment variables (see
//! [`ClientConfig::from_env`]). `--log-format json` (or `FLEETDECK_LOG_FORMAT=json`)
//! switches to JSON logs.

mod cli;

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use fleetdeck_client::{
    ClientConfig, DispatchOutcome, DispatchRequest, Notification, OutcomeHandler, RequestDispatcher,
};
use fleetdeck_core::{
    Command, Confirmation, Confirmed, CsrfToken, Payload, Pick, RawSelection, TargetResolver,
    Targeting,
};

use crate::cli::{Cli, Commands, LogOutput};

/// Prints what a browser panel would show in dialogs.
struct ConsoleHandler;

impl OutcomeHandler for ConsoleHandler {
    fn on_notify(&mut self, notification: &Notification) {
        if notification.is_error() {
            eprintln!("{}", notification);
        } else {
            println!("{}", notification);
        }
    }

    fn on_redirect(&mut self, target: &str) {
        println!("-> {}", target);
    }

    fn on_result(&mut self, outcome: &DispatchOutcome) {
        match outcome.body() {
            Some(body) if !body.is_null() => println!("{}", body),
            _ => {}
        }
    }
}

fn targets_for(environments: &str, config: &ClientConfig) -> Result<Targeting> {
    let picks: Vec<Pick<String>> = environments
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| if e == "all" { Pick::All } else { Pick::value(e) })
        .collect();

    let options = || config.environment_options.iter().cloned().map(Pick::Value);
    let spec = TargetResolver::resolve(
        RawSelection::new().environments(picks),
        options,
        Vec::<Pick<String>>::new,
    )?;
    Ok(Targeting::Resolved(spec))
}

fn confirm_on_stdin(confirmation: Confirmation) -> Result<Option<Confirmed>> {
    print!("{} [y/N] ", confirmation.message());
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let affirmed = matches!(answer.trim(), "y" | "Y" | "yes");
    Ok(confirmation.affirm(affirmed))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.log_format {
        LogOutput::Json => fleetdeck_observability::init(),
        LogOutput::Pretty => fleetdeck_observability::init_pretty(),
    }

    let config = ClientConfig::from_env().context("reading FLEETDECK_* configuration")?;
    let token = config.csrf_token.clone().unwrap_or_else(|| {
        tracing::warn!("FLEETDECK_CSRF_TOKEN not set; sending an empty token");
        CsrfToken::new("")
    });
    let dispatcher = RequestDispatcher::http(&config)?;

    let request = match cli.command {
        Commands::Query { envs, sql, repeat } => {
            let targets = targets_for(&envs, &config)?;
            let command = Command::builder(token, targets, Payload::query(sql.join(" ")))
                .repeat(repeat)
                .build()?;
            DispatchRequest::post("/query/run", command).redirect_to("/query/list")
        }
        Commands::Carve { envs, path } => {
            let targets = targets_for(&envs, &config)?;
            let command = Command::builder(token, targets, Payload::carve(path)).build()?;
            DispatchRequest::post("/carves/run", command).redirect_to("/carves/list")
        }
        Commands::RemoveNodes { uuids, yes } => {
            let prompt = Confirmation::for_count(uuids.len(), "node", "nodes");
            let confirmed = if yes {
                prompt.affirm(true)
            } else {
                confirm_on_stdin(prompt)?
            };
            let Some(confirmed) = confirmed else {
                println!("aborted");
                return Ok(());
            };
            let targets = Targeting::preselected(uuids);
            let command = Command::builder(token, targets, Payload::RemoveNodes)
                .confirmed(confirmed)
                .build()?;
            DispatchRequest::post("/node/actions", command).notify(true)
        }
        Commands::Get { endpoint } => DispatchRequest::get(endpoint, token),
    };

    let outcome = dispatcher.dispatch(request, &mut ConsoleHandler).await;
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
