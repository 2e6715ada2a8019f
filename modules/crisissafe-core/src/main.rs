use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crisissafe_common::{Analysis, CheckStatus, Config};
use crisissafe_core::{Analyzer, Deps};

/// Verify a claim or article URL and print a credibility report.
#[derive(Parser)]
#[command(name = "crisissafe", about = "Claim verification from the command line")]
struct Args {
    /// Claim text, or text containing one URL
    claim: Vec<String>,

    /// Archive file location (overrides ARCHIVE_PATH)
    #[arg(long)]
    archive: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("crisissafe=info".parse()?))
        .init();

    let args = Args::parse();
    let claim = args.claim.join(" ");
    if claim.trim().is_empty() {
        anyhow::bail!("No content to verify. Pass a claim or URL as an argument.");
    }

    let mut config = Config::from_env();
    if let Some(archive) = args.archive {
        config.archive_path = archive;
    }

    info!("CrisisSafe analyzer starting");
    let analyzer = Analyzer::new(Deps::from_config(&config));
    let analysis = analyzer.analyze(&claim).await;

    render(&analysis);
    Ok(())
}

fn render(analysis: &Analysis) {
    let result = &analysis.result;

    println!("\n========== RESULT ==========");
    if analysis.from_archive {
        println!("Pulled from archive");
    }
    println!("Credibility score: {}%", result.score);
    println!("Subjective: {}", result.is_subjective);

    println!("\nChecklist:");
    for (name, status) in result.checklist.entries() {
        let mark = match status {
            CheckStatus::Pass => "✓",
            CheckStatus::Fail => "✗",
            CheckStatus::Uncertain => "?",
            CheckStatus::NotApplicable => "-",
        };
        println!("  {mark} {name}");
    }

    if !result.flags.is_empty() {
        println!("\nFlags:");
        for flag in &result.flags {
            println!("  - {flag}");
        }
    }

    println!("\nAI report:\n{}", result.ai_report);

    if !result.pointers.is_empty() {
        println!("\nWorth asking:");
        for pointer in &result.pointers {
            println!("  - {pointer}");
        }
    }

    if !result.related_articles.is_empty() {
        println!("\nRelated articles:");
        for article in &result.related_articles {
            println!("  {} ({})", article.title, article.url);
        }
    }
}
