use crate::commands::{Cli, Commands, InspectCommand, ValidateCommand};
use crate::cue::models::Sheet;
use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{error, info};
use std::path::Path;

mod commands;
mod cue;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(cmd) => inspect(cmd).await?,
        Commands::Validate(cmd) => validate(cmd).await?,
    }

    Ok(())
}

/// Reads a cue sheet file, guessing its encoding first. Cue sheets in
/// the wild are frequently not UTF-8.
async fn read_cue_text(path: &Path) -> Result<String> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(&data, true);
    let encoding: &'static encoding_rs::Encoding = detector.guess(None, true);
    log::debug!("decoding {} as {}", path.display(), encoding.name());

    let (text, _, _) = encoding.decode(&data);
    Ok(text.into_owned())
}

async fn inspect(cmd: InspectCommand) -> Result<()> {
    let text = read_cue_text(&cmd.input).await?;
    let sheet = cue::parse_str(&text, &cmd.durations)
        .with_context(|| format!("failed to parse {}", cmd.input.display()))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&sheet)?);
    } else {
        print_sheet(&sheet);
    }

    Ok(())
}

async fn validate(cmd: ValidateCommand) -> Result<()> {
    let mut failed = 0usize;

    for input in &cmd.inputs {
        let text = read_cue_text(input).await?;
        match cue::parse_str(&text, &[]) {
            Ok(_) => info!("{}: OK", input.display()),
            Err(err) => {
                error!("{}: {}", input.display(), err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} cue sheet(s) failed validation", cmd.inputs.len());
    }

    Ok(())
}

fn print_sheet(sheet: &Sheet) {
    if let Some(title) = &sheet.title {
        println!("Title:      {title}");
    }
    if let Some(performer) = &sheet.performer {
        println!("Performer:  {performer}");
    }
    if let Some(songwriter) = &sheet.songwriter {
        println!("Songwriter: {songwriter}");
    }
    if let Some(catalog) = &sheet.catalog {
        println!("Catalog:    {catalog}");
    }
    for comment in &sheet.comments {
        println!("Comment:    {comment}");
    }

    for file in &sheet.files {
        println!();
        println!("{} ({:?}, {:.2}s)", file.name, file.file_type, file.duration);
        for track in &file.tracks {
            println!(
                "  {:02} {:<10} {:>9.2}s .. {:>9.2}s  {}",
                track.number,
                format!("{:?}", track.data_type),
                track.start_position,
                track.end_position,
                track.title.as_deref().unwrap_or(""),
            );
        }
    }
}
