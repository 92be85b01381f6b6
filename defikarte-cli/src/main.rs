use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use defikarte::{Config, Region};
use std::path::PathBuf;

mod commands;

/// List and submit defibrillator (AED) locations on OpenStreetMap
#[derive(Parser)]
#[command(name = "defikarte")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overpass API base address
    #[arg(
        long,
        env = "DEFIKARTE_OVERPASS_URL",
        default_value = defikarte::config::DEFAULT_OVERPASS_URL,
        global = true
    )]
    overpass_url: String,

    /// ISO 3166-1 code of the region to query
    #[arg(
        long,
        env = "DEFIKARTE_REGION",
        default_value = defikarte::config::DEFAULT_REGION,
        global = true
    )]
    region: String,

    /// OSM API server address
    #[arg(long, env = "DEFIKARTE_OSM_API_URL", global = true)]
    osm_api_url: Option<String>,

    /// OSM account used for edits
    #[arg(long, env = "DEFIKARTE_OSM_USERNAME", global = true)]
    osm_username: Option<String>,

    /// Password of the OSM account
    #[arg(
        long,
        env = "DEFIKARTE_OSM_USER_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    osm_user_password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format of the `list` command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
    Csv,
    Geojson,
}

#[derive(Subcommand)]
enum Commands {
    /// List all AEDs of the region
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a new AED from a JSON request file
    Submit {
        /// JSON file with latitude, longitude, emergencyPhone, location,
        /// openingHours, operatorPhone, operatorName, accessible, indoor
        input: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut builder = Config::builder()
            .overpass_url(&self.overpass_url)
            .region(Region::new(&self.region));

        if let Some(url) = &self.osm_api_url {
            builder = builder.osm_api_url(url);
        }
        if let Some(username) = &self.osm_username {
            builder = builder.osm_username(username);
        }
        if let Some(password) = &self.osm_user_password {
            builder = builder.osm_user_password(password);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Commands::List { format, output } => commands::list::run(config, format, output).await,
        Commands::Submit { input } => commands::submit::run(config, input).await,
    }
}
