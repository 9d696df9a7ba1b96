use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::Config;
use crate::lsp::backend::Backend;

/// Start the LSP server on stdin/stdout
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // stdout carries the protocol, so logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match &config.config_path {
        Some(path) => log::info!("loaded configuration from {}", path.display()),
        None => log::debug!("no configuration file, using defaults"),
    }

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config.clone())).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
