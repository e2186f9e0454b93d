#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::{Args, Command};
use clap::Parser;
use modelmux_config::Config;
use modelmux_llm::{Dispatcher, Message, TagSet};
use modelmux_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logging settings live in the config, so nothing can be logged before it loads
    let mut config = Config::load_or_default(args.config.as_deref())?;

    modelmux_telemetry::init(&config.telemetry)?;

    match args.config.as_deref() {
        Some(path) => tracing::debug!(config_path = %path.display(), "loaded configuration"),
        None => tracing::debug!("no config file given, using environment defaults"),
    }

    match args.command {
        Command::Serve { listen } => {
            if listen.is_some() {
                config.server.listen_address = listen;
            }
            serve(&config).await
        }
        Command::Ask { prompt, tags, system } => ask(&config, prompt, tags, system).await,
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!("starting modelmux");

    let server = Server::new(config)?;

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("modelmux stopped");
    Ok(())
}

/// One direct dispatch; prints the reply text, or the raw response if it has none
async fn ask(config: &Config, prompt: String, tags: Vec<String>, system: Option<String>) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::from_config(&config.llm)?;
    let tags: TagSet = tags.into_iter().collect();

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));

    let response = dispatcher.chat(&messages, &tags).await?;

    match response.first_content() {
        Some(text) => println!("{text}"),
        None => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
