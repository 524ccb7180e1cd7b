//! Quill CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Markup validation failure
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{context, Cli, Commands};
use quill_i18n::I18nError;
use quill_view::ViewError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "quill=debug"
    } else if cli.quiet {
        "quill=error"
    } else {
        "quill=info"
    };
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive(default_level.parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args),
        Commands::Tags(args) => commands::tags::execute(args),
        Commands::Check(args) => commands::check::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code.
///
/// Only typed causes and the outermost context are inspected; inner causes
/// carry user paths.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        match cause.downcast_ref::<ViewError>() {
            Some(ViewError::TemplateNotFound { .. }) => return ExitCodes::TEMPLATE_ERROR,
            Some(ViewError::InvalidInclude { .. }) => return ExitCodes::INVALID_ARGS,
            _ => {}
        }
        if let Some(I18nError::NotFound(_)) = cause.downcast_ref::<I18nError>() {
            return ExitCodes::INVALID_ARGS;
        }
    }

    let msg = e.to_string();
    if msg.starts_with(context::MARKUP_INVALID) {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.starts_with(context::TEMPLATE_NOT_FOUND) {
        ExitCodes::TEMPLATE_ERROR
    } else if [
        context::BINDINGS_NOT_FOUND,
        context::INVALID_BINDINGS,
        context::INVALID_CONFIG,
    ]
    .iter()
    .any(|prefix| msg.starts_with(prefix))
    {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_paths_do_not_pick_the_exit_code() {
        let err = Err::<(), _>(std::io::Error::from(std::io::ErrorKind::NotFound))
            .context(format!(
                "{}: /srv/templates/validation/data.yaml",
                context::BINDINGS_NOT_FOUND
            ))
            .unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);

        let err = anyhow!("disk full").context("Failed to write output /srv/templates/out.html");
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }

    #[test]
    fn test_typed_causes() {
        let err = anyhow::Error::new(ViewError::TemplateNotFound {
            path: "main.html".to_string(),
        });
        assert_eq!(categorize_error(&err), ExitCodes::TEMPLATE_ERROR);

        let err = anyhow::Error::new(I18nError::NotFound("/srv/i18n".into()))
            .context("Failed to load translations from /srv/i18n");
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_markup_failure() {
        let err = anyhow!("{}: 2 problem(s)", context::MARKUP_INVALID);
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    }
}
