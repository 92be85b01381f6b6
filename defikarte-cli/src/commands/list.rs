use anyhow::{Context, Result};
use defikarte::{Config, DefibrillatorService, OverpassElement};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::Format;

/// Tags shown as columns in table and CSV output.
const COLUMNS: [&str; 6] = [
    "defibrillator:location",
    "opening_hours",
    "operator",
    "phone",
    "access",
    "indoor",
];

pub async fn run(config: Config, format: Format, output: Option<PathBuf>) -> Result<()> {
    let region = config.region().iso3166_1().to_string();
    let service = DefibrillatorService::new(config);

    let elements = service
        .all_defibrillators()
        .await
        .context("Failed to query Overpass")?;

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context("Failed to create output file")?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    write_elements(writer, format, &elements, &region)?;

    if let Some(path) = output {
        println!("Output written to: {}", path.display());
    }
    Ok(())
}

pub fn write_elements<W: Write>(
    mut writer: W,
    format: Format,
    elements: &[OverpassElement],
    region: &str,
) -> Result<()> {
    match format {
        Format::Table => write_table(&mut writer, elements, region)?,
        Format::Json => serde_json::to_writer_pretty(&mut writer, elements)?,
        Format::Csv => write_csv(&mut writer, elements)?,
        Format::Geojson => serde_json::to_writer_pretty(
            &mut writer,
            &defikarte::geojson::to_feature_collection(elements),
        )?,
    }
    writer.flush()?;
    Ok(())
}

fn write_table<W: Write>(writer: &mut W, elements: &[OverpassElement], region: &str) -> Result<()> {
    if elements.is_empty() {
        writeln!(writer, "No AEDs found in region {}", region)?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:>12} {:>10} {:>10}  {:<30} {:<6}",
        "ID", "LAT", "LON", "LOCATION", "INDOOR"
    )?;
    writeln!(writer, "{}", "-".repeat(72))?;

    let mut indoor_count = 0;
    let mut accessible_count = 0;

    for element in elements {
        let indoor = tag(element, "indoor");
        if indoor == "yes" {
            indoor_count += 1;
        }
        if tag(element, "access") == "yes" {
            accessible_count += 1;
        }

        writeln!(
            writer,
            "{:>12} {:>10} {:>10}  {:<30} {:<6}",
            element.id,
            coordinate(element.lat),
            coordinate(element.lon),
            truncate(tag(element, "defibrillator:location"), 30),
            indoor
        )?;
    }

    // Summary
    writeln!(writer)?;
    writeln!(writer, "Region: {}", region)?;
    writeln!(
        writer,
        "Total: {} AEDs ({} indoor, {} publicly accessible)",
        elements.len(),
        indoor_count,
        accessible_count
    )?;
    Ok(())
}

fn write_csv<W: Write>(writer: &mut W, elements: &[OverpassElement]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut headers = vec!["id", "lat", "lon"];
    headers.extend(COLUMNS);
    csv_writer.write_record(&headers)?;

    for element in elements {
        let mut record = vec![
            element.id.to_string(),
            element.lat.map(|v| v.to_string()).unwrap_or_default(),
            element.lon.map(|v| v.to_string()).unwrap_or_default(),
        ];
        record.extend(COLUMNS.iter().map(|key| tag(element, key).to_string()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn tag<'a>(element: &'a OverpassElement, key: &str) -> &'a str {
    element.tags.get(key).map(String::as_str).unwrap_or("")
}

fn coordinate(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.5}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut short: String = value.chars().take(max - 3).collect();
        short.push_str("...");
        short
    }
}
