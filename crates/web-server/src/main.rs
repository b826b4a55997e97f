use configuration::{init_tracing, load_config};
use std::net::SocketAddr;
use std::path::Path;

// This main function is the entry point when running `cargo run -p web-server`.
// Its only job is to load the configuration and call `run_server` from the crate's library.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = load_config(Path::new("config.toml"))?;
    let _guard = init_tracing(config.general.log_dir.as_deref())?;

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    web_server::run_server(addr, config).await
}
