//! Check command: report external tool status.

use console::style;

use crate::config::Settings;
use crate::ocr::{OcrBackend, TesseractBackend};

/// Install guidance per tool.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "tesseract" => "apt install tesseract-ocr  |  brew install tesseract",
        _ => "apt install poppler-utils  |  brew install poppler",
    }
}

pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let tools = &settings.ocr.tools;

    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("Tools:").cyan());
    let mut all_found = true;
    for (tool, available) in tools.check() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
        if !available {
            println!("                  {}", style(install_hint(&tool)).dim());
        }
    }
    if let Some(dir) = &tools.poppler_dir {
        println!("  {:<15} {}", "poppler dir", style(dir.display()).dim());
    }

    println!("\n{}", style("Tesseract languages:").cyan());
    let tesseract = TesseractBackend::with_binary(tools.tesseract.clone());
    let mut any_language = false;
    if tesseract.is_available() {
        let installed = tokio::task::spawn_blocking(move || tesseract.list_languages()).await?;
        match installed {
            Ok(installed) => {
                for language in &settings.ocr.languages {
                    let present = installed.iter().any(|l| l == language);
                    let status = if present {
                        any_language = true;
                        style("✓ installed").green()
                    } else {
                        style("✗ missing").red()
                    };
                    println!("  {:<15} {}", language, status);
                    if !present {
                        println!(
                            "                  {}",
                            style(format!("apt install tesseract-ocr-{}", language)).dim()
                        );
                    }
                }
            }
            Err(e) => println!("  {} {}", style("✗").red(), e),
        }
    } else {
        println!("  {}", style(tesseract.availability_hint()).dim());
    }

    println!();
    if all_found && any_language {
        println!("{} Required OCR tools are available", style("✓").green());
    } else {
        println!(
            "{} Some tools are missing; scanned PDFs and images will fail until they are installed",
            style("✗").red()
        );
    }

    Ok(())
}
