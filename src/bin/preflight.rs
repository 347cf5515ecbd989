//! Checks configuration and record-store connectivity before a deploy.

use product_inquiry::domain::model::{inquiry::INQUIRIES_TABLE, product::PRODUCTS_TABLE, project::PROJECTS_TABLE};
use product_inquiry::infra::{clients, telemetry};
use product_inquiry::storage::tables::Filter;
use product_inquiry::{AppConfig, RecordStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads the same env vars as api_server:\n\
           RECORD_STORE, AIRTABLE_API_KEY, AIRTABLE_BASE_ID, IMGBB_API_KEY,\n\
           RESEND_API_KEY, NOTIFY_EMAIL_TO, ALLOWED_ORIGINS, FRONTEND_URL\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let config = AppConfig::from_env()?;
    println!("> Preflight:");
    println!("  RECORD_STORE={}", config.store.kind());
    println!("  image host configured: {}", config.imgbb_api_key.is_some());
    println!("  email configured: {}", config.email.is_some());
    println!("  allowed origins: {}", config.allowed_origins.join(", "));
    println!("  inquiry links: {}/?project=<id>", config.frontend_url.trim_end_matches('/'));

    let store = clients::record_store(&config)?;
    // A filter no real row matches: proves the table exists and the key can read it.
    let probe = Filter::equals("id", "__preflight__");
    for table in [PROJECTS_TABLE, PRODUCTS_TABLE, INQUIRIES_TABLE] {
        store
            .select(table, &probe)
            .await
            .map_err(|e| anyhow::anyhow!("table '{}' is not readable: {}", table, e))?;
        println!("  table '{}' readable.", table);
    }

    println!("> Preflight OK.");
    Ok(())
}
