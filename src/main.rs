use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jbdap::cli::{self, Cli};
use jbdap::config::{self, DEFAULT_LOG_LEVEL};

fn main() -> Result<()> {
    // handle broken pipe gracefully (e.g., when piping to `head` or `jq` that exits early)
    reset_sigpipe();

    let cli = Cli::parse();
    init_tracing(&cli);

    cli::run(cli)
}

/// reset SIGPIPE to default behavior (terminate process) instead of panicking
/// this is the standard Unix behavior for CLI tools
fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// RUST_LOG wins, then --verbose, then settings.log_level
fn init_tracing(cli: &Cli) {
    let fallback = if cli.verbose {
        "debug".to_string()
    } else {
        config::get_config_path(cli.config.as_deref())
            .and_then(|path| config::load(&path))
            .map(|config| config.settings.log_level)
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
