use anyhow::{Context, Result};
use defikarte::{Config, DefibrillatorService};
use std::fs;
use std::path::PathBuf;

pub fn read_request(input: &PathBuf) -> Result<String> {
    fs::read_to_string(input)
        .with_context(|| format!("Failed to read request file: {}", input.display()))
}

pub async fn run(config: Config, input: PathBuf) -> Result<()> {
    let body = read_request(&input)?;
    let service = DefibrillatorService::new(config);

    let node = service
        .create_defibrillator(body.trim())
        .await
        .context("Failed to add AED")?;

    println!("{}", serde_json::to_string_pretty(&node)?);
    Ok(())
}
