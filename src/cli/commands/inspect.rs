//! Inspect command: dry run of the pipeline on one file.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::models::NameSource;
use crate::ocr::ExtractionMethod;
use crate::organizer::inspect;
use crate::progress::ConsoleSink;
use crate::services::detect_year_with_strategy;
use crate::storage::Filer;

pub async fn cmd_inspect(settings: &Settings, file: &Path, show_text: bool) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let extractor = settings.extractor();
    let path = file.to_path_buf();
    let inspection =
        tokio::task::spawn_blocking(move || inspect(&path, &extractor, &ConsoleSink::stdout()))
            .await??;

    println!("\n{}", style(file.display()).bold());
    println!("{}", "-".repeat(50));

    let chars = inspection
        .text
        .as_ref()
        .map(|t| t.as_str().chars().count())
        .unwrap_or(0);
    let method = match &inspection.method {
        Some(ExtractionMethod::EmbeddedText) => "embedded PDF text".to_string(),
        Some(ExtractionMethod::Ocr { language }) => format!("OCR ({})", language),
        None => "no text found".to_string(),
    };
    println!("  {:<10} {} ({} chars)", "Text:", method, chars);

    let info = &inspection.info;
    let name_note = match info.name_source {
        Some(NameSource::Content) => style("from document text").dim(),
        Some(NameSource::Filename) => style("from file name").yellow(),
        None => style("not detected").red(),
    };
    println!("  {:<10} {} {}", "Name:", info.name_label(), name_note);

    let year_note = match inspection
        .text
        .as_ref()
        .and_then(|t| detect_year_with_strategy(t.as_str()))
    {
        Some((_, strategy)) => style(format!("({})", strategy.as_str())).dim(),
        None => style("not detected".to_string()).red(),
    };
    println!("  {:<10} {} {}", "Year:", info.year_label(), year_note);

    if inspection.text.is_some() {
        println!(
            "  {:<10} {}/",
            "Folder:",
            style(Filer::bucket_for(info).display()).green()
        );
    } else {
        println!(
            "  {:<10} {}",
            "Folder:",
            style("not filed (counted as unidentified)").yellow()
        );
    }

    if show_text {
        if let Some(text) = &inspection.text {
            println!("\n{}", style("Extracted text:").cyan());
            println!("{}", text.as_str());
        }
    }

    Ok(())
}
