use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carbonflow_core::database::DatabaseManager;
use carbonflow_core::storage::{DatabaseStorage, EmissionStore};
use carbonflow_server::server;

#[derive(Parser)]
#[command(name = "carbonflow-server")]
#[command(about = "HTTP API server for the CarbonFlow emissions platform")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Delete every stored emission record
    ClearDatabase,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("carbonflow_server=debug,carbonflow_core=debug,info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Initialize database storage
    info!("Initializing database storage...");
    let db_manager = Arc::new(DatabaseManager::new()?);
    db_manager.run_migrations()?;
    let store: Arc<dyn EmissionStore> = Arc::new(DatabaseStorage::new(db_manager.clone()));
    info!("Database storage initialized successfully");

    match cli.command {
        Commands::Serve { port } => {
            println!("🚀 Starting CarbonFlow API server on port {port}...");
            println!("📡 Server endpoints:");
            println!("   Upload:       http://localhost:{port}/api/upload");
            println!("   Sankey data:  http://localhost:{port}/api/emissions/sankey");
            println!("   PDF export:   http://localhost:{port}/api/exports/pdf");
            println!("   Excel export: http://localhost:{port}/api/exports/excel");
            println!("   Health check: http://localhost:{port}/api/health");
            println!();

            server::start_server(store, port).await?;
        }
        Commands::ClearDatabase => {
            let deleted = store.delete_all().await?;
            println!("🗑️  Deleted {deleted} emission records from {}", db_manager.path());
        }
    }

    Ok(())
}
