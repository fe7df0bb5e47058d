use furnish_server::config::loader::load_config;
use furnish_server::{ServerBuilder, build_state, observability};

#[tokio::main]
async fn main() {
    // .env is optional; only complain about a malformed one.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    let (config_path, source) = resolve_config_path();
    let cfg = match load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    tracing::info!(path = config_path.as_deref().unwrap_or("furnish.toml"), source, "configuration loaded");

    observability::apply_logging_level(&cfg.logging.level);

    let state = match build_state(&cfg).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Startup error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = ServerBuilder::new(cfg, state).build().run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Config path from `--config <path>`, then `FURNISH_CONFIG`, then the
/// default `furnish.toml` lookup inside the loader.
fn resolve_config_path() -> (Option<String>, &'static str) {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (Some(path), "cli");
            }
        }
    }
    if let Ok(path) = std::env::var("FURNISH_CONFIG") {
        return (Some(path), "env");
    }
    (None, "default")
}
