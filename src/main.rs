use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixforge::protocol::{TaskRequest, TaskResult};
use pixforge::{client, server, tasks};

#[derive(Parser)]
#[command(name = "pixforge")]
#[command(about = "TCP task service for PNG resizing and color quantization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the task server
    Serve {
        /// Address to listen on (overrides BIND_ADDR; default 0.0.0.0:8989)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Resize a PNG locally, without a server
    Scale {
        /// Source PNG path
        source: String,

        /// Destination PNG path
        dest: String,

        /// Target canvas width in pixels
        #[arg(short = 'W', long, value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        /// Target canvas height in pixels
        #[arg(short = 'H', long, value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,
    },
    /// Quantize a PNG locally, without a server
    Quantize {
        /// Source PNG path
        source: String,

        /// Destination PNG path
        dest: String,

        /// Maximum number of output colors
        #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
        colors: u32,
    },
    /// Send a single request to a running server and print the result
    Request {
        /// Server address to connect to
        #[arg(short, long, default_value = "127.0.0.1:8989")]
        addr: String,

        #[command(subcommand)]
        task: RequestTask,
    },
}

#[derive(Subcommand)]
enum RequestTask {
    /// Ask the server to resize a PNG
    Scale {
        source: String,
        dest: String,
        #[arg(short = 'W', long, value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,
        #[arg(short = 'H', long, value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,
    },
    /// Ask the server to quantize a PNG
    Quantize {
        source: String,
        dest: String,
        #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
        colors: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            init_tracing("pixforge=debug");
            run_server(bind).await
        }
        Commands::Scale {
            source,
            dest,
            width,
            height,
        } => {
            init_tracing("pixforge=warn");
            tasks::scale_file(&source, &dest, width, height)?;
            println!("Scaled {source} -> {dest} ({width}x{height})");
            Ok(())
        }
        Commands::Quantize {
            source,
            dest,
            colors,
        } => {
            init_tracing("pixforge=warn");
            tasks::quantize_file(&source, &dest, colors)?;
            println!("Quantized {source} -> {dest} ({colors} colors)");
            Ok(())
        }
        Commands::Request { addr, task } => {
            init_tracing("pixforge=warn");
            run_request(&addr, task).await
        }
    }
}

/// Initialize tracing with an env-filter fallback.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the task server until ctrl-c.
async fn run_server(bind: Option<String>) -> anyhow::Result<()> {
    let bind_addr = bind
        .or_else(|| std::env::var("BIND_ADDR").ok())
        .unwrap_or_else(|| "0.0.0.0:8989".to_string());

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c");
            signal_token.cancel();
        }
    });

    server::run(&bind_addr, shutdown).await
}

/// Submit one request as a client and report the outcome.
async fn run_request(addr: &str, task: RequestTask) -> anyhow::Result<()> {
    let request = match task {
        RequestTask::Scale {
            source,
            dest,
            width,
            height,
        } => TaskRequest::Scale {
            source,
            dest,
            width,
            height,
        },
        RequestTask::Quantize {
            source,
            dest,
            colors,
        } => TaskRequest::Quantize {
            source,
            dest,
            colors,
        },
    };

    match client::submit(addr, &request).await? {
        TaskResult::Ok => {
            println!("OK");
            Ok(())
        }
        TaskResult::Failed(message) => {
            eprintln!("Task failed on the server ({message})");
            std::process::exit(1);
        }
    }
}
