use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use retail_data_centraliser::cli::{self, CredentialPaths, DEFAULT_MANIFEST};
use retail_data_centraliser::driver::{Entity, RunOptions};
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Multinational Retail Data Centraliser: extract, clean and load retail data into one PostgreSQL star schema
#[derive(Parser)]
#[command(name = "mrdc", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source environment variables from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// Database credentials file
    #[arg(long, global = true, default_value = "db_creds.yaml")]
    creds: PathBuf,

    /// Stores API credentials file
    #[arg(long, global = true, default_value = "api_creds.yaml")]
    api_creds: PathBuf,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, clean and load every entity of the pipeline
    Run {
        /// Pipeline manifest (defaults to the built-in retail pipeline)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Only process these entities
        #[arg(long, value_enum, value_delimiter = ',')]
        only: Vec<Entity>,

        /// Directory to save raw extracts to
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        /// Directory to save cleaned tables to as CSV
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip loading into the target database
        #[arg(long)]
        dry_run: bool,
    },

    /// List the tables of the source database
    Tables,

    /// Clean a CSV snapshot of one entity without touching any database
    Clean {
        /// Entity the CSV holds
        #[arg(value_enum)]
        entity: Entity,

        /// Raw CSV file
        input: PathBuf,

        /// Cleaned CSV file to write
        output: PathBuf,
    },

    /// Write the built-in pipeline manifest to a file
    Manifest {
        /// The manifest file to generate
        #[arg(default_value = DEFAULT_MANIFEST)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display().bright_black()),
        Err(e) if e.not_found() => log::debug!("No dotenv file at {}", cli.env.bright_black()),
        Err(e) => return Err(e.into()),
    }

    let creds = CredentialPaths {
        db: cli.creds,
        api: cli.api_creds,
    };

    match cli.command {
        Commands::Run {
            manifest,
            only,
            raw_dir,
            output_dir,
            dry_run,
        } => {
            let options = RunOptions {
                only,
                raw_dir,
                output_dir,
                dry_run,
            };
            let summary = cli::run_pipeline(manifest.as_deref(), &options, &creds).await?;
            let total: usize = summary.iter().map(|(_, count)| count).sum();
            log::info!(
                "Finished {} entities, {} rows",
                summary.len().cyan(),
                total.cyan()
            );
        }
        Commands::Tables => {
            log::info!("Listing tables from {}", creds.db.display().bright_black());
            for table in cli::list_source_tables(&creds.db).await? {
                println!("{}", table);
            }
        }
        Commands::Clean {
            entity,
            input,
            output,
        } => {
            let count = cli::clean_csv(entity, &input, &output).await?;
            log::info!("✓ Wrote {} cleaned rows", count);
        }
        Commands::Manifest { file } => {
            cli::write_default_manifest(&file)?;
        }
    }

    Ok(())
}
