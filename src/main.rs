//! ftz2ged - Kommandoradsverktyg
//!
//! Konverterar FTZ-släktträdsarkiv till GEDCOM 5.5.1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ftz2ged::utils::file_ops::find_ftz_files;
use ftz2ged::{ConvertOptions, Converter};

#[derive(Parser, Debug)]
#[command(
    name = "ftz2ged",
    version,
    about = "Konverterar FTZ-släktträdsarkiv till GEDCOM 5.5.1"
)]
struct Args {
    /// Arkivfil eller katalog att söka igenom efter .ftz-arkiv
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Sök igenom katalogen rekursivt
    #[arg(short, long)]
    recursive: bool,

    /// Skriv utfilerna till denna katalog i stället för bredvid arkiven
    #[arg(short, long, value_name = "KATALOG")]
    out_dir: Option<PathBuf>,

    /// Skriv den upplösta modellen som JSON bredvid varje GEDCOM-fil
    #[arg(long)]
    json: bool,

    /// Utförligare loggning
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initiera logging
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    tracing::info!("Startar ftz2ged v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let inputs = if args.path.is_file() {
        vec![args.path.clone()]
    } else {
        find_ftz_files(&args.path, args.recursive)?
    };

    if inputs.is_empty() {
        tracing::warn!("Inga .ftz-arkiv hittades i {}", args.path.display());
        return Ok(true);
    }

    let converter = Converter::new(ConvertOptions {
        out_dir: args.out_dir.clone(),
        json_sidecar: args.json,
    });
    let result = converter.convert_all(&inputs);
    tracing::info!("{}", result.summary());

    Ok(result.all_ok())
}
