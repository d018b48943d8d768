//! managesw tool server binary
//!
//! Detects the host package manager once, then serves package tools over
//! stdio, a Unix socket or HTTP.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use managesw_lib::config::{Settings, Transport};
use managesw_lib::core::{PackageService, SystemRunner};
use managesw_lib::package_managers::detect_backend;
use managesw_lib::server;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

/// managesw - operating system package tools for MCP clients
#[derive(Parser, Debug)]
#[command(name = "managesw-mcp")]
#[command(version)]
#[command(about = "Package management tool server (zypper, dnf, dpkg)")]
struct Args {
    /// Alternate filesystem root passed to every package tool
    #[arg(long, env = "MANAGESW_ROOT")]
    root: Option<PathBuf>,

    /// Transport to serve on
    #[arg(long, value_enum)]
    transport: Option<Transport>,

    /// Serve on this Unix socket (implies --transport socket)
    #[arg(long, env = "MANAGESW_SOCKET", conflicts_with = "http")]
    socket: Option<PathBuf>,

    /// Serve streamable HTTP at this address (implies --transport http)
    #[arg(long, env = "MANAGESW_HTTP", value_name = "ADDR")]
    http: Option<String>,

    /// Config file (default: $MANAGESW_CONFIG_DIR/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format, always written to stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Print the detected backend and exit
    #[arg(long)]
    detect_only: bool,

    /// Write the effective settings to the config file and exit
    #[arg(long, conflicts_with = "detect_only")]
    write_config: bool,
}

impl Args {
    /// Command-line values win over the config file
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(root) = self.root {
            settings.root = Some(root);
        }
        if let Some(transport) = self.transport {
            settings.transport = transport;
        }
        if let Some(socket) = self.socket {
            settings.socket_path = socket;
            settings.transport = Transport::Socket;
        }
        if let Some(addr) = self.http {
            settings.http_addr = addr;
            settings.transport = Transport::Http;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        settings
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Settings::config_path);
    let settings = Settings::load_from(&config_path)?;
    let log_format = args.log_format;
    let detect_only = args.detect_only;
    let write_config = args.write_config;
    let settings = args.apply(settings);

    if write_config {
        settings
            .save_to(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("{}", config_path.display());
        return Ok(());
    }

    init_tracing(&settings.log_level, log_format);
    tracing::info!("Starting managesw-mcp v{}", env!("CARGO_PKG_VERSION"));

    let root = settings.root.clone();
    if let Some(root) = &root {
        tracing::info!("using alternate root {}", root.display());
    }
    let backend = tokio::task::spawn_blocking(move || detect_backend(Arc::new(SystemRunner), root))
        .await
        .context("backend detection did not complete")?;

    if detect_only {
        println!("{}", backend.name());
        return Ok(());
    }

    let service = PackageService::builder(backend)
        .default_query_lines(settings.default_query_lines)
        .build();

    match settings.transport {
        Transport::Stdio => server::run_stdio(service).await?,
        Transport::Http => {
            let listener = server::bind_http(&settings.http_addr).await?;
            server::run_http(listener, service).await?;
        }
        Transport::Socket => {
            let listener = server::bind_socket(&settings.socket_path)?;
            let result = server::run_socket(listener, service).await;
            if settings.socket_path.exists() {
                let _ = std::fs::remove_file(&settings.socket_path);
            }
            result?;
        }
    }

    tracing::info!("managesw-mcp stopped");
    Ok(())
}
