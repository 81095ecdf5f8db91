use std::sync::Arc;

use advisor_core::config::{FrontendMode, Settings};
use advisor_core::Advisor;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod headless;

#[derive(Debug, Parser)]
#[command(name = "advisor", about = "Buy/Sell/Hold advisor for a single ticker")]
struct Args {
    /// Ticker to evaluate. Defaults to ADVISOR_DEFAULT_TICKER.
    #[arg(long)]
    ticker: Option<String>,

    /// Calendar days of history to load (30..=365). Defaults to ADVISOR_LOOKBACK_DAYS.
    #[arg(long)]
    days: Option<u32>,

    /// Last date of the window (YYYY-MM-DD). Defaults to today's UTC date.
    #[arg(long)]
    end_date: Option<String>,

    /// Overrides ADVISOR_FRONTEND (headless or interactive).
    #[arg(long)]
    frontend: Option<FrontendMode>,

    /// Rows shown at each end of the raw data preview.
    #[arg(long, default_value_t = advisor_core::advisor::DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let frontend = args.frontend.unwrap_or(settings.frontend);

    let advisor = Advisor::from_settings(&settings)
        .inspect_err(|err| {
            sentry_anyhow::capture_anyhow(err);
        })?
        .with_preview_rows(args.preview_rows);

    tracing::info!(%frontend, "starting advisor");

    match frontend {
        FrontendMode::Headless => {
            let opts = headless::RunOptions {
                ticker: args.ticker.unwrap_or_else(|| settings.default_ticker.clone()),
                days: args.days.unwrap_or(settings.lookback_days),
                end_date: args.end_date,
            };
            headless::run(&advisor, opts).await
        }
        FrontendMode::Interactive => {
            let state = advisor_api::AppState {
                advisor: Arc::new(advisor),
                tickers: Arc::new(settings.tickers.clone()),
                default_days: args.days.unwrap_or(settings.lookback_days),
            };
            advisor_api::serve(state, settings.port).await
        }
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
