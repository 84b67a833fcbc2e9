use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use huddle_channels::CreateChannelRequest;
use huddle_config::load as load_config;
use huddle_directory::{CreateGroupRequest, Role, User};
use huddle_gateway::{create_router, AppState};
use huddle_runtime::{telemetry, Services};

#[derive(Parser)]
#[command(name = "huddle-server")]
#[command(about = "Huddle chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server (default)
    Serve,
    /// Seed the directory with a default admin, demo group, and channel
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Seed => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Huddle backend");

    let config = load_config().context("failed to load configuration")?;

    let services = Services::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = AppState::new(services.db_pool.clone(), services.directory.clone());
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(huddle_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;

    let services = Services::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let created = services
        .directory
        .ensure_user(User {
            id: "1".to_string(),
            username: "super".to_string(),
            email: "super@huddle.local".to_string(),
            password: "123".to_string(),
            roles: vec![Role::SuperAdmin],
            groups: Vec::new(),
        })
        .await
        .context("failed to seed super admin")?;

    if created {
        info!("seeded super admin user");
    } else {
        info!("super admin user already present");
    }

    let groups = services.directory.groups_for("super").await?;
    if groups.is_empty() {
        let group = services
            .directory
            .create_group(&CreateGroupRequest {
                name: "General".to_string(),
                admin: "super".to_string(),
            })
            .await?;

        let state = AppState::new(services.db_pool.clone(), services.directory.clone());
        let channel = state
            .chat()
            .create_channel(&CreateChannelRequest {
                group_id: group.group_id.clone(),
                name: "General".to_string(),
            })
            .await?;

        services
            .directory
            .add_channel_to_group(&group.group_id, channel.id)
            .await?;

        info!(group_id = %group.group_id, channel_id = channel.id, "seeded demo group and channel");
    }

    Ok(())
}
