//! export-staging - rebuild the export staging collections

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use export_staging::{config::Args, db::MongoClient, Stager, StagingScope};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("export_staging={},warn", args.log_level).into());
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if let Err(e) = args.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    let scope = StagingScope::default();
    let config = args.staging_config();

    info!("======================================");
    info!("  Export staging");
    info!("======================================");
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Organizations: {}", scope.mnemonics().collect::<Vec<_>>().join(", "));
    info!("Staging collections: {}", config.collections.all().join(", "));
    info!("Batch size: {}", config.batch_size);
    info!("======================================");

    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let stager = Stager::new(mongo, scope, config);
    let report = stager
        .run()
        .await
        .with_context(|| format!("staging into '{}' failed", stager.store().db_name()))?;

    println!("{}", report);
    Ok(())
}
