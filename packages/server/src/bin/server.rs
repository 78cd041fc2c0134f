//! Hiroba chat gateway.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server -- --port 9090
//! ```

use clap::Parser;
use hiroba_server::{ServerArgs, ServerConfig};
use hiroba_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    if let Err(e) = hiroba_server::run_server(ServerConfig::from(args)).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
