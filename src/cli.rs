//! Command-line surface.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::client::ItemsClient;
use crate::config;
use crate::pipeline::{PipelineController, Stage};

#[derive(Parser)]
#[command(author, version, about = "Save-file serial uploader for the community item database", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decrypt a save file, extract item serials, and upload them
    Upload {
        /// Encrypted save file (.sav)
        file: PathBuf,
        /// Numeric account id the save belongs to (17-digit Steam id)
        #[arg(long = "account-id")]
        account_id: String,
    },
    /// Decode a single serial through the service
    Decode { serial: String },
    /// Submit a single serial, optionally naming the item
    Submit {
        serial: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// List catalogued items
    List {
        #[arg(long, default_value_t = config::DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

pub fn run(cli: Cli) -> Result<(), String> {
    let client = ItemsClient::from_env();

    match cli.command {
        Commands::Upload { file, account_id } => upload(&file, &account_id, client),
        Commands::Decode { serial } => decode(&serial, &client),
        Commands::Submit { serial, name } => submit(&serial, name.as_deref(), &client),
        Commands::List { limit, offset } => list(limit, offset, &client),
    }
}

fn upload(file: &Path, account_id: &str, client: ItemsClient) -> Result<(), String> {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());
    let data =
        std::fs::read(file).map_err(|e| format!("failed to read {}: {e}", file.display()))?;

    let mut controller = PipelineController::with_sink(Box::new(client));
    controller
        .start(&file_name, data, account_id)
        .map_err(|e| e.to_string())?;

    loop {
        match controller.stage() {
            Stage::LoadingDecryptor => eprintln!("Loading decryption module..."),
            Stage::Decrypting => eprintln!("Decrypting save file..."),
            Stage::Extracting => eprintln!("Extracting items..."),
            Stage::Uploading => eprintln!(
                "Uploading {} items...",
                controller.serial_count().unwrap_or_default()
            ),
            _ => {}
        }
        if controller.step().is_terminal() {
            break;
        }
    }

    match controller.outcome() {
        Some(outcome) => {
            println!("Found {} items in your save.", outcome.total);
            println!("{} new items added to the database.", outcome.succeeded);
            if outcome.failed > 0 {
                println!("{} already existed.", outcome.failed);
            }
            Ok(())
        }
        None => Err(controller
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "An unknown error occurred".to_string())),
    }
}

fn decode(serial: &str, client: &ItemsClient) -> Result<(), String> {
    let decoded = client.decode_serial(serial).map_err(|e| e.to_string())?;

    match decoded.level {
        Some(level) => println!("{} (level {})", decoded.item_type_name, level),
        None => println!("{}", decoded.item_type_name),
    }
    for tag in [
        decoded.manufacturer.as_deref(),
        decoded.weapon_type.as_deref(),
        decoded.element.as_deref(),
        decoded.rarity.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        println!("  {tag}");
    }
    println!("  serial: {}", decoded.serial);
    if !decoded.parts.is_empty() {
        println!("  parts ({}):", decoded.parts.len());
        for part in &decoded.parts {
            let name = part
                .name
                .clone()
                .unwrap_or_else(|| format!("Part #{}", part.index));
            match part.category.as_deref() {
                Some(category) => println!("    [{category}] {name}"),
                None => println!("    {name}"),
            }
        }
    }
    Ok(())
}

fn submit(serial: &str, name: Option<&str>, client: &ItemsClient) -> Result<(), String> {
    use crate::client::SubmitOutcome;

    match client.submit_item(serial, name).map_err(|e| e.to_string())? {
        SubmitOutcome::Accepted => println!("Submitted."),
        SubmitOutcome::AlreadyKnown => println!("Already in the database."),
    }
    Ok(())
}

fn list(limit: u32, offset: u32, client: &ItemsClient) -> Result<(), String> {
    let page = client.list_items(limit, offset).map_err(|e| e.to_string())?;

    for item in &page.items {
        let name = item.name.as_deref().unwrap_or("(unnamed)");
        let rarity = item.rarity.as_deref().unwrap_or("-");
        println!(
            "{:38} {:10} {:12} {}",
            item.serial, rarity, item.verification_status, name
        );
    }
    println!(
        "showing {}-{} of {}",
        page.offset,
        page.offset as u64 + page.items.len() as u64,
        page.total
    );
    Ok(())
}
