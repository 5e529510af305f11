use std::{io, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use session_core::{RandomSelector, StandupController};
use shared::domain::RoundLimit;
use storage::Storage;
use text_generation::{DailyAssistant, GeminiGenerator, Locale};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod repl;

use config::{load_settings, prepare_database_url};

#[derive(Parser, Debug)]
#[command(about = "Pick who speaks next in the daily standup")]
struct Args {
    #[arg(long, default_value = "standup.toml")]
    config: PathBuf,
    #[arg(long)]
    database_url: Option<String>,
    /// Sector to open right away (list number, id or name).
    #[arg(long)]
    sector: Option<String>,
    /// Speakers before the daily ends, or "all".
    #[arg(long)]
    limit: Option<RoundLimit>,
    #[arg(long)]
    spin_ms: Option<u64>,
    #[arg(long)]
    locale: Option<Locale>,
    /// Skip the text model and use the built-in phrases.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }
    if let Some(limit) = args.limit {
        settings.default_round_limit = limit;
    }
    if let Some(spin_ms) = args.spin_ms {
        settings.spin_delay_ms = spin_ms;
    }
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    storage.health_check().await?;

    let assistant = match settings.gemini_api_key.as_deref() {
        Some(api_key) if !args.offline => {
            match GeminiGenerator::new(api_key, settings.gemini_model.clone()) {
                Ok(generator) => DailyAssistant::new(Arc::new(generator), settings.locale),
                Err(error) => {
                    warn!(%error, "text model unavailable, using built-in phrases");
                    DailyAssistant::offline(settings.locale)
                }
            }
        }
        _ => DailyAssistant::offline(settings.locale),
    };

    let controller = StandupController::new(
        storage,
        Box::new(RandomSelector::new()),
        settings.spin_delay(),
    )
    .with_default_round_limit(settings.default_round_limit);

    info!(
        %database_url,
        spin_delay_ms = settings.spin_delay_ms,
        round_limit = %settings.default_round_limit,
        locale = %settings.locale,
        "standup ready"
    );

    let mut app = repl::App::new(controller, assistant);
    let mut stdout = io::stdout();
    if let Some(sector) = args.sector.as_deref() {
        if let Err(error) = app.open(&mut stdout, sector).await {
            warn!(%error, sector, "could not open sector");
        }
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    app.run(stdin, &mut stdout).await
}
