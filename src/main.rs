use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repo_privacy_check::{Audit, Config, Credentials, GitHubClient, SlackNotifier};

#[derive(Parser)]
#[command(name = "repo-privacy-check")]
#[command(about = "Report the public repositories of a GitHub organization to a webhook")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Organization to audit (overrides the configuration file)
    #[arg(short, long)]
    org: Option<String>,

    /// Print the message instead of posting it to the webhook
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config)?;
    init_logging(cli.verbose, &config.logging.level);
    info!("Starting repo-privacy-check v{}", env!("CARGO_PKG_VERSION"));

    if let Some(org) = cli.org {
        config.github.organization = org;
    }

    // Both secrets are checked before any request goes out
    let credentials = Credentials::from_env(&config)?;
    let http = config.http.build_client()?;

    let source = GitHubClient::new(&config.github, credentials.token, http.clone());
    let notifier = SlackNotifier::new(credentials.webhook_url, http);
    let audit = Audit::new(
        source,
        notifier,
        config.github.organization.as_str(),
        config.github.single_page_policy(),
    );

    if cli.dry_run {
        let report = audit.collect().await?;
        print!("{}", report.payload().text);
        info!("Dry run, notification not sent");
        return Ok(());
    }

    let report = audit.run().await?;
    info!(
        "Reported {} public repositories across {} page(s)",
        report.public_repositories.len(),
        report.pages_fetched
    );
    Ok(())
}

/// Initialize logging; `RUST_LOG` wins, then `--verbose`, then the configured level
fn init_logging(verbose: bool, level: &str) {
    let fallback = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}
