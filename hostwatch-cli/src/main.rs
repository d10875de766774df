//! Hostwatch CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hostwatch_config::{load_from_file, validate_config, Config, LogFormat};
use hostwatch_core::Host;
use hostwatch_notify::{HttpNotifier, ReportBuilder};
use hostwatch_probe::{build_probe, Probe};
use hostwatch_runtime::{Dispatcher, Scheduler, SignalHandler, WorkerConfig, WorkerPool};
use hostwatch_store::ResultStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "hostwatch")]
#[command(about = "Periodic host reachability monitor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Probe the configured hosts until interrupted
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "hostwatch.yaml", env = "HOSTWATCH_CONFIG")]
        config: PathBuf,

        /// Log level (trace, debug, info, warn, error); overrides the config file
        #[arg(short, long)]
        log_level: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "hostwatch.yaml", env = "HOSTWATCH_CONFIG")]
        config: PathBuf,
    },

    /// Probe one host once with every enabled check and print its report
    Report {
        /// Path to configuration file
        #[arg(short, long, default_value = "hostwatch.yaml", env = "HOSTWATCH_CONFIG")]
        config: PathBuf,

        /// Host to probe
        #[arg(long)]
        host: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, log_level } => {
            let config = load(&config)?;
            let logging = &config.observability.logging;
            init_tracing(log_level.as_deref().unwrap_or(&logging.level), logging.format)?;

            validate_config(&config)?;
            serve(config)
        }

        Commands::Validate { config: path } => {
            init_tracing("info", LogFormat::Text)?;
            tracing::info!("Validating configuration: {}", path.display());

            let config = load(&path)?;
            match validate_config(&config) {
                Ok(()) => {
                    print_summary(&config);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Report { config, host } => {
            let config = load(&config)?;
            init_tracing("warn", LogFormat::Text)?;
            validate_config(&config)?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to build runtime")?;
            let report = runtime.block_on(probe_once(&config, Host::new(host)?))?;
            println!("{report}");
            Ok(())
        }

        Commands::Version => {
            println!("hostwatch");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

/// Read a configuration file. Parse-time warnings go to stderr because the
/// configured subscriber does not exist yet.
fn load(path: &Path) -> Result<Config> {
    let bootstrap = fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .finish();

    tracing::subscriber::with_default(bootstrap, || load_from_file(path))
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn serve(config: Config) -> Result<()> {
    let pool = WorkerPool::new(WorkerConfig {
        max_threads: config.max_threads.get(),
        ..WorkerConfig::default()
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(pool.size())
        .thread_name(pool.thread_name())
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    runtime.block_on(run(config, pool))
}

async fn run(config: Config, pool: WorkerPool) -> Result<()> {
    tracing::info!("Starting hostwatch");

    let store = ResultStore::new();
    let notifier = HttpNotifier::new(
        ReportBuilder::new(store.clone()),
        &config.report.url,
        config.report.timeout,
    )?;
    tracing::info!(destination = %notifier.destination(), "Reporting failures");

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(notifier));
    let mut scheduler = Scheduler::new(pool, dispatcher);

    for kind in config.enabled_checks() {
        let spec = config.schedule_spec(kind)?;
        scheduler.schedule(build_probe(kind, spec.timeout()), &spec);
    }

    tracing::info!(tasks = scheduler.task_count(), "Checks running");

    SignalHandler::new(scheduler.shutdown_signal()).run().await?;

    let stats = scheduler.shutdown(config.shutdown_timeout).await;
    tracing::info!(
        hosts = store.hosts().len(),
        executions = stats.executions,
        failures = stats.failures,
        "hostwatch stopped"
    );
    Ok(())
}

async fn probe_once(config: &Config, host: Host) -> Result<String> {
    let store = ResultStore::new();

    for kind in config.enabled_checks() {
        let probe = build_probe(kind, config.response_timeout);
        let outcome = probe.ping(&host).await?;
        store.record(kind, &host, outcome)?;
    }

    Ok(ReportBuilder::new(store).render(&host)?)
}

fn print_summary(config: &Config) {
    let pool_size = WorkerConfig {
        max_threads: config.max_threads.get(),
        ..WorkerConfig::default()
    }
    .pool_size();

    tracing::info!("Configuration is valid");
    tracing::info!("  Report URL: {}", config.report.url);
    tracing::info!("  Max threads: {}", config.max_threads.get());
    tracing::info!("  Pool size: {}", pool_size);

    for kind in config.enabled_checks() {
        tracing::info!(
            "  {}: {} host(s) every {}ms",
            kind,
            config.host_names(kind).len(),
            config.check(kind).interval.as_millis()
        );
    }
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level '{level}'"))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(false))
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_level(true))
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["hostwatch", "serve", "-c", "mon.yaml", "-l", "debug"])
            .unwrap();
        match cli.command {
            Commands::Serve { config, log_level } => {
                assert_eq!(config, PathBuf::from("mon.yaml"));
                assert_eq!(log_level.as_deref(), Some("debug"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_requires_host() {
        assert!(Cli::try_parse_from(["hostwatch", "report"]).is_err());

        let cli = Cli::try_parse_from(["hostwatch", "report", "--host", "h1"]).unwrap();
        assert!(matches!(cli.command, Commands::Report { host, .. } if host == "h1"));
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let err = load(Path::new("/nonexistent/hostwatch.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hostwatch.yaml"));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"hosts: \"a;b\"\nreport:\n  url: collector:8080\n")
            .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.hosts.len(), 2);
        assert!(validate_config(&config).is_ok());
    }
}
