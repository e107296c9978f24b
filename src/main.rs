//! tab-chaos-analyzer - version 0.1.0
//!
//! Command-line front end for the tab analysis library with tracing logging.
//! Reads tab lists, access-time maps and resource snapshots from JSON files
//! and dispatches the subcommands.

mod cli;
mod commands;
mod config;

use clap::{CommandFactory, Parser};
use tab_chaos_analyzer::TabAnalyzer;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};

use cli::{Args, Commands, LogLevel};
use commands::{
    command_categories, command_classify, command_config, command_duplicates,
    command_generate_testdata, command_old, command_report, command_track, command_watch,
};
use config::{
    build_analyzer_config, effective_log_level, resolve_config, show_config,
    validate_effective_config, Config,
};

/// Initializes tracing logging subsystem with the effective log level.
///
/// Logs go to stderr so structured output on stdout stays parseable.
fn setup_logging(level: &LogLevel) {
    let log_level = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    debug!("Logging initialized with level: {:?}", level);
}

/// Helper function to validate the resolved configuration.
/// Exits the process with error code 1 if validation fails.
fn validated(config: anyhow::Result<Config>) -> anyhow::Result<Config> {
    let config = config?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Configures the global rayon pool used for classification.
fn configure_parallelism(config: &Config) {
    if let Some(threads) = config.parallelism {
        if threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .unwrap_or_else(|e| error!("Failed to set rayon thread pool: {}", e));
            debug!("Rayon thread pool configured with {} threads", threads);
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The config file may set the log level, so resolve it first
    let resolved = resolve_config(&args);
    let level = match &resolved {
        Ok(config) => effective_log_level(config).unwrap_or(LogLevel::Info),
        Err(_) => args.log_level.clone().unwrap_or(LogLevel::Info),
    };
    setup_logging(&level);

    // Show/check modes
    if args.show_config || args.check_config {
        let config = resolved?;

        if args.check_config {
            // Loading the tables also compiles every pattern.
            let checked = validate_effective_config(&config).and_then(|_| build_analyzer_config(&config));
            if let Err(e) = checked {
                eprintln!("❌ Configuration invalid: {:#}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, &args.config_format);
    }

    let Some(command) = &args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    // Config generation works without a valid config
    if let Commands::Config {
        output,
        format,
        commented,
    } = command
    {
        return command_config(output.clone(), format.clone(), *commented);
    }

    let config = validated(resolved)?;
    configure_parallelism(&config);
    let analyzer = TabAnalyzer::new(build_analyzer_config(&config)?);

    info!("Starting tab-chaos-analyzer");

    match command {
        Commands::Classify { tabs, format } => command_classify(tabs, *format, &analyzer),

        Commands::Duplicates { tabs, format } => command_duplicates(tabs, *format, &analyzer),

        Commands::Old {
            tabs,
            access_times,
            now_ms,
            format,
        } => command_old(tabs, access_times, *now_ms, *format, &analyzer),

        Commands::Report {
            tabs,
            snapshot,
            access_times,
            now_ms,
            format,
        } => {
            command_report(
                tabs,
                snapshot.as_deref(),
                access_times.as_deref(),
                *now_ms,
                *format,
                &analyzer,
                &config,
            )
            .await
        }

        Commands::Watch {
            tabs,
            snapshot,
            interval,
            iterations,
        } => {
            command_watch(
                tabs.clone(),
                snapshot.clone(),
                *interval,
                *iterations,
                analyzer,
                &config,
            )
            .await
        }

        Commands::Track {
            access_times,
            event,
            tab_id,
            at_ms,
        } => command_track(access_times, *event, *tab_id, *at_ms),

        Commands::Categories { verbose, category } => {
            command_categories(&analyzer.config().rules, *verbose, category.clone())
        }

        Commands::GenerateTestdata {
            output_dir,
            tabs,
            duplicate_ratio,
        } => command_generate_testdata(output_dir.clone(), *tabs, *duplicate_ratio),

        // Handled before config loading
        Commands::Config { .. } => Ok(()),
    }
}
