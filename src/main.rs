use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use url::Url;

use portal::cli::Args;
use portal::config::Config;
use portal::crawl;
use portal::fuzzy::TokenSortRatio;
use portal::generator::{self, names::RussianNames};
use portal::logging::setup_logging;
use portal::{correct, portal as client};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config and setup logging first so startup errors are visible.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    info!(version = env!("CARGO_PKG_VERSION"), "starting portal");

    if !args.any_enabled() {
        warn!("no stage selected, nothing to do (try --all)");
        return ExitCode::SUCCESS;
    }

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "pipeline failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &Config) -> anyhow::Result<()> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current work");
            signal_cancel.cancel();
        }
    });

    let main_url = Url::parse(&config.main_url).context("parsing main portal url")?;

    if args.institutes_enabled() || args.departments_enabled() || args.programs_enabled() {
        let mut session = client::PortalClient::new(
            config.primary_credentials(),
            config.ssl_certificate.as_deref(),
            config.pause_range(),
        )?;

        if args.institutes_enabled() {
            crawl::crawl_institutes(&mut session, &pool, &main_url).await?;
        } else {
            info!("institute stage skipped");
        }
        if args.departments_enabled() {
            crawl::crawl_departments(&mut session, &pool, &main_url).await?;
        } else {
            info!("department stage skipped");
        }
        if args.programs_enabled() {
            crawl::crawl_programs(&mut session, &pool, &main_url).await?;
        } else {
            info!("program stage skipped");
        }
    }

    if args.subjects_enabled() {
        crawl::subjects::crawl_subjects(&pool, config, cancel.clone()).await?;
    } else {
        info!("subject stage skipped");
    }

    if cancel.is_cancelled() {
        info!("stopping before offline stages");
        return Ok(());
    }

    if args.correct_enabled() {
        let scorer = TokenSortRatio;
        let mut rng = rand::rng();
        correct::run(&pool, &scorer, &mut rng).await?;
    } else {
        info!("correction stage skipped");
    }

    if args.generate_enabled() {
        let mut names = RussianNames::new(rand::rng());
        let mut rng = rand::rng();
        let cfg = config.generator();
        generator::run(&pool, &cfg, &mut names, &mut rng, Utc::now().date_naive()).await?;
    } else {
        info!("generator stage skipped");
    }

    info!("pipeline finished");
    Ok(())
}
