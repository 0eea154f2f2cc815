use court_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. dotenv + logging
    setup_environment()?;

    print_banner();
    tracing::info!("Court server starting...");

    // 2. configuration
    let config = Config::from_env()?;

    // 3. state (opens the order store)
    let state = ServerState::initialize(&config)?;

    // 4. serve (starts background tasks, stops on Ctrl-C)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
