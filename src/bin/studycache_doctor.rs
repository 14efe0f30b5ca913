/**
 * StudyCache Doctor
 *
 * Inspects the local offline store: collection counts, downloaded sets and
 * the pending attempt queue. With `--sync` it runs one sync cycle against
 * the configured backend.
 */

use studycache::client::config::Config;
use studycache::client::local_db::AttemptFilter;
use studycache::client::OfflinePractice;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let mut run_sync = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--sync" => run_sync = true,
            "-h" | "--help" => {
                println!("Usage: studycache_doctor [--sync]");
                println!();
                println!("Environment: STUDYCACHE_API_URL, STUDYCACHE_DB_PATH, STUDYCACHE_TOKEN,");
                println!("             STUDYCACHE_CONFIG (TOML file), RUST_LOG");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(2);
            }
        }
    }

    let config = Config::load()?;
    if let Some(path) = config.database_path() {
        println!("Store:   {}", path.display());
    }
    println!("Backend: {}", config.server_url());

    let practice = OfflinePractice::connect(&config).await?;
    let store = practice.store();

    let stats = store.stats().await?;
    println!("Schema version:   {}", store.schema_version().await?);
    println!("Cached sets:      {}", stats.cached_sets);
    println!("Pending attempts: {}", stats.pending_attempts);
    println!("Synced, unpurged: {}", stats.synced_attempts);

    let sets = practice.list_downloaded().await?;
    if !sets.is_empty() {
        println!();
        println!("Downloaded sets:");
        for set in &sets {
            println!(
                "  #{:<6} {:<40} {:>3} questions  {}",
                set.set_id,
                set.title,
                set.question_count(),
                set.downloaded_at.to_rfc3339()
            );
        }
    }

    let pending = store.list_pending_attempts(&AttemptFilter::default()).await?;
    if !pending.is_empty() {
        println!();
        println!("Pending queue:");
        for attempt in &pending {
            println!(
                "  [{}] user {} set {} question {} correct={} at {}",
                attempt.local_id,
                attempt.user_id,
                attempt.set_id,
                attempt.question_id,
                attempt.is_correct,
                attempt.recorded_at.to_rfc3339()
            );
        }
    }

    if run_sync {
        println!();
        let report = practice.sync().await;
        println!(
            "Sync: {} synced, {} failed{}{}",
            report.synced,
            report.failed,
            if report.skipped { " (skipped)" } else { "" },
            if report.errored { " (errors logged)" } else { "" }
        );
        if report.is_failure() {
            std::process::exit(1);
        }
    }

    Ok(())
}
