use anyhow::{Context, Result};
use sales_call_analyzer::pdf_extract::extract_transcript;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Sales Call Transcript PDF -> Text");
    println!("=================================");

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <pdf_file_path>", args[0]);
        eprintln!("Example: {} /path/to/call_transcript.pdf", args[0]);
        std::process::exit(1);
    }

    let pdf_path = &args[1];
    println!("Processing PDF: {}", pdf_path);
    println!();

    let bytes = tokio::fs::read(pdf_path)
        .await
        .with_context(|| format!("Failed to read {}", pdf_path))?;

    match extract_transcript(bytes).await {
        Ok(transcript) => {
            println!(
                "Extraction completed: {} characters from {} page(s)",
                transcript.text.chars().count(),
                transcript.page_count
            );
            println!();

            println!("Transcript (first 500 chars):");
            println!("────────────────────────────────────");
            let preview = if transcript.text.chars().count() > 500 {
                let truncated: String = transcript.text.chars().take(500).collect();
                format!("{}...", truncated)
            } else {
                transcript.text.clone()
            };
            println!("{}", preview);
            println!("────────────────────────────────────");

            for warning in &transcript.warnings {
                println!("Page {} skipped: {}", warning.page, warning.reason);
            }
        }
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
