//! Organize command.

use std::sync::Arc;

use console::style;
use tokio::sync::mpsc;

use crate::cli::helpers::progress_bar;
use crate::config::Settings;
use crate::organizer::{OrganizeEvent, Organizer};
use crate::progress::ConsoleSink;
use crate::storage::Filer;

/// File every document in the source folder into the destination tree.
pub async fn cmd_organize(settings: &Settings) -> anyhow::Result<()> {
    if !settings.source_dir.is_dir() {
        anyhow::bail!(
            "Source folder '{}' not found. Create it and put your PDFs and images inside.",
            settings.source_dir.display()
        );
    }

    println!(
        "{} Organizing {} into {}",
        style("→").cyan(),
        settings.source_dir.display(),
        settings.dest_dir.display()
    );

    let progress = progress_bar(0);
    progress.set_message("Analyzing documents...");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let sink = Arc::new(ConsoleSink::new(progress.clone()));
    let organizer = Organizer::new(settings.extractor(), Filer::new(&settings.dest_dir), sink)
        .with_workers(settings.workers)
        .with_events(event_tx);

    let pb = progress.clone();
    let display = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                OrganizeEvent::Started { total } => pb.set_length(total as u64),
                OrganizeEvent::DocumentFinished { file_name, .. } => {
                    pb.set_message(file_name);
                    pb.inc(1);
                }
                OrganizeEvent::Finished(_) => pb.finish_and_clear(),
            }
        }
    });

    let result = organizer.run(&settings.source_dir).await;
    // Closes the event channel so the display task ends
    drop(organizer);
    let _ = display.await;
    let summary = result?;

    if summary.total() == 0 {
        println!(
            "{} No PDF or image files found in {}",
            style("!").yellow(),
            settings.source_dir.display()
        );
        return Ok(());
    }

    println!();
    println!("{}", style("Summary").bold());
    println!("{}", "-".repeat(40));
    println!("  {:<22} {}", "Processed:", style(summary.processed).green());
    let errors = if summary.errors > 0 {
        style(summary.errors).red()
    } else {
        style(summary.errors).dim()
    };
    println!("  {:<22} {}", "Errors/Unidentified:", errors);
    println!(
        "\n{} Organized copies are in {}",
        style("✓").green(),
        settings.dest_dir.display()
    );

    Ok(())
}
