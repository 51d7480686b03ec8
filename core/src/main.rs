use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use plantdoc_core::config;
use plantdoc_core::logging::init_tracing;
use plantdoc_core::present::{api_status_label, class_cards, FileInfo, ResultView};
use plantdoc_core::workflow::CLASSES_UNAVAILABLE;
use plantdoc_core::{ClassCatalog, HttpClassifier, ImageFile, Notice, NoticeKind, Session, SessionDriver};

/// Command-line client for the plant disease classification API.
#[derive(Parser)]
#[command(name = "plantdoc-cli", version, about)]
struct Cli {
    /// API base URL (overrides config file and PLANTDOC_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file to use instead of the default user config.
    #[arg(long, global = true, env = "PLANTDOC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the API is reachable.
    Health,
    /// List the diseases the model can detect.
    Classes,
    /// Upload a plant photo and print the diagnosis.
    Predict {
        /// JPG, PNG, GIF or BMP image, at most 5MB.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut client_config = config::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        client_config = client_config.with_api_base_url(url)?;
    }
    info!("Using API at {}", client_config.api_base_url);

    let api = HttpClassifier::from_config(&client_config)?;
    let mut driver = SessionDriver::new(api, Session::new(client_config.request_timeout()));

    match cli.command {
        Command::Health => {
            let status = driver.check_api_health().await.clone();
            print_notices(&mut driver);
            println!("API status: {}", api_status_label(&status));
            if !status.is_connected() {
                bail!("API at {} is not available", client_config.api_base_url);
            }
        }
        Command::Classes => match driver.load_detectable_classes().await {
            ClassCatalog::Loaded(classes) if classes.is_empty() => {
                println!("The API reports no detectable classes.");
            }
            ClassCatalog::Loaded(classes) => {
                for card in class_cards(classes) {
                    println!(
                        "{} {:<20} {:<30} {}",
                        card.icon.glyph(),
                        card.title,
                        card.disease_text,
                        card.badge
                    );
                }
            }
            ClassCatalog::Unavailable(reason) => {
                bail!("{} ({})", CLASSES_UNAVAILABLE, reason);
            }
            ClassCatalog::Loading => {}
        },
        Command::Predict { file } => {
            let image = ImageFile::from_path(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let info = FileInfo::new(&image);
            println!("{} ({})", info.name, info.size_text);

            let selected = driver.select_file(image);
            print_notices(&mut driver);
            selected?;

            let outcome = driver.analyze().await.map(ResultView::new);
            print_notices(&mut driver);
            print_result(&outcome?);
        }
    }

    Ok(())
}

fn print_notices(driver: &mut SessionDriver<HttpClassifier>) {
    for Notice { kind, message } in driver.take_notices() {
        match kind {
            NoticeKind::Success => eprintln!("[ok] {}", message),
            NoticeKind::Error => eprintln!("[error] {}", message),
        }
    }
}

fn print_result(view: &ResultView) {
    println!();
    println!("{}  {}", view.disease_name, view.confidence_text);
    println!("{}", view.plant_text);
    println!("{}", view.status_text);
    println!("{}", view.time_text);
    println!();
    println!("{}", view.advice);
    if let Some(note) = &view.note {
        println!("{}", note);
    }
    println!();
    println!("Top predictions:");
    for row in &view.predictions {
        println!("  {}. {:<40} {}", row.rank, row.name, row.percent_text);
    }
}
