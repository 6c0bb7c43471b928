//! Clinical registry curation CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::error;
use tracing::level_filters::LevelFilter;

use clinreg_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use clinreg_cli::commands::{resolve_catalog, run_curate, run_entities, run_validate};
use clinreg_cli::logging::{LogConfig, LogFormat, init_logging};
use clinreg_cli::summary::{print_curation_summary, print_validation_summary};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let catalog = match resolve_catalog(cli.catalog.as_deref()) {
        Ok(catalog) => catalog,
        Err(error) => {
            error!("{error:#}");
            eprintln!("error: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    let success = match &cli.command {
        Command::Curate(args) => match run_curate(args, &catalog) {
            Ok(report) => {
                print_curation_summary(&report);
                !report.has_errors()
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                false
            }
        },
        Command::Validate(args) => match run_validate(args, &catalog) {
            Ok(report) => {
                print_validation_summary(&report);
                report.all_passed()
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                false
            }
        },
        Command::Entities => match run_entities(&catalog) {
            Ok(()) => true,
            Err(error) => {
                eprintln!("error: {error:#}");
                false
            }
        },
    };
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
