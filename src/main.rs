use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use screen_ops_reporting::activity::DailyActivityService;
use screen_ops_reporting::config::AppConfig;
use screen_ops_reporting::db::{self, PgStore};
use screen_ops_reporting::models::{ReportRequest, ReportType};
use screen_ops_reporting::render;
use screen_ops_reporting::reporting::ReportingService;

#[derive(Parser)]
#[command(name = "screen-ops-reporting")]
#[command(about = "Component change reports and daily activity for screen maintenance", long_about = None)]
struct Cli {
    /// Tracing filter directive, e.g. `info` or `screen_ops_reporting=debug`
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo companies, screens, tickets and worker reports
    Seed,
    /// Import worker reports from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a component change report
    Report {
        #[arg(long = "type", default_value = "summary")]
        report_type: ReportType,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long = "screen")]
        screens: Vec<Uuid>,
        #[arg(long = "component")]
        components: Vec<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Per-screen chronological component history
    History {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long = "screen")]
        screens: Vec<Uuid>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Daily creation counts for users, contracts, tickets and companies
    Activity {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn emit(output: String, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Written to {}.", path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} reports from {}.", csv.display());
        }
        Commands::Report {
            report_type,
            start,
            end,
            screens,
            components,
            format,
            out,
        } => {
            let service = ReportingService::new(PgStore::new(pool));
            let request = ReportRequest {
                report_type,
                start_date: start,
                end_date: end,
                screen_ids: screens,
                components,
            };
            let report = service.generate_report(&request).await?;
            let output = match format {
                Format::Json => serde_json::to_string_pretty(&report)? + "\n",
                Format::Markdown => render::report_markdown(&report),
                Format::Csv => render::records_csv(&report.detailed_records)?,
            };
            emit(output, out.as_deref())?;
        }
        Commands::History {
            start,
            end,
            screens,
            format,
            out,
        } => {
            let service = ReportingService::new(PgStore::new(pool));
            let histories = service.screen_history(&screens, start, end).await?;
            let output = match format {
                Format::Json => serde_json::to_string_pretty(&histories)? + "\n",
                Format::Markdown => render::history_markdown(&histories),
                Format::Csv => anyhow::bail!("screen history has no CSV form; use json or markdown"),
            };
            emit(output, out.as_deref())?;
        }
        Commands::Activity {
            start,
            end,
            format,
            out,
        } => {
            let service = DailyActivityService::new(PgStore::new(pool));
            let activity = service.daily_activity(start, end).await?;
            let output = match format {
                Format::Json => serde_json::to_string_pretty(&activity)? + "\n",
                Format::Markdown => render::activity_markdown(&activity),
                Format::Csv => render::activity_csv(&activity)?,
            };
            emit(output, out.as_deref())?;
        }
    }

    Ok(())
}
