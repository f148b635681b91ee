//! Tracing setup for the command-line front end.
//!
//! Diagnostics go to stderr so stdout stays machine-readable. With
//! `--log-file`, events are also written to a daily-rotated file in the
//! cache directory.

use std::io::IsTerminal;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::args::GlobalArgs;

/// Default filter directive for the given verbosity flags.
fn default_directive(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "off";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn env_filter(args: &GlobalArgs) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(args)))
}

/// Install the global subscriber.
///
/// Returns a `WorkerGuard` that must be kept alive for the file logging to
/// flush.
pub fn init_tracing(args: &GlobalArgs) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .with_filter(env_filter(args));

    let log_dir = args
        .log_file
        .then(|| lspy_conf::project_dirs().map(|dirs| dirs.cache_dir().to_path_buf()))
        .flatten();

    let Some(log_dir) = log_dir else {
        Registry::default().with(stderr_layer).init();
        return None;
    };

    let file_appender = tracing_appender::rolling::daily(log_dir, "lspy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter(args));

    Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(quiet: bool, verbose: u8) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            log_file: false,
        }
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(&args(false, 0)), "warn");
        assert_eq!(default_directive(&args(false, 1)), "info");
        assert_eq!(default_directive(&args(false, 2)), "debug");
        assert_eq!(default_directive(&args(false, 7)), "trace");
        assert_eq!(default_directive(&args(true, 0)), "off");
    }
}
