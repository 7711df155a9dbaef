use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

use backend::console::{Console, Flow};

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let config = backend::config::Config::parse();

    let level = config.log_level;
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::filter_fn(move |meta| {
            let target = meta.target();
            (target.contains("backend") || target.contains("scoring") || target.contains("scorekeeper"))
                && *meta.level() <= level
        }));
    if let Err(e) = tracing::subscriber::set_global_default(registry) {
        eprintln!("Setting up logging: {}", e);
        return std::process::ExitCode::FAILURE;
    }

    tracing::info!(data_dir = %config.data_dir.display(), "Starting...");

    let (tick_tx, mut tick_rx) = backend::ticker::channel();
    let persistence = backend::storage::Persistence::new(backend::storage::FileStore::new(
        config.data_dir.clone(),
    ));

    let mut app = match backend::App::load(persistence, config.timers(), tick_tx).await {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Loading stored state: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut console = Console::new();
    println!("{}", backend::console::render(&app));

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Reading input: {}", e);
                        return std::process::ExitCode::FAILURE;
                    }
                };

                let (flow, output) = console.handle(&mut app, &line).await;
                if !output.is_empty() {
                    println!("{}", output);
                }
                if flow == Flow::Quit {
                    break;
                }
            }
            Some(tick) = tick_rx.recv() => {
                if let Some(output) = console.on_tick(&mut app, tick) {
                    println!("{}", output);
                }
            }
        }
    }

    tracing::info!("Stopping");
    std::process::ExitCode::SUCCESS
}
