//! Command handlers

use std::io::Write;

use tracing::debug;

use crate::cli::output::print_usage;
use crate::cli::output::truncate_str;
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::rag::RagResponse;
use crate::rag::RagService;
use crate::Result;

/// Run one invocation. Without a query this prints usage and returns
/// before any configuration is read or any client is built.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let Some(query) = cli.query else {
        print_usage(out)?;
        return Ok(());
    };

    let config = AppConfig::load(cli.config.as_deref())?;

    let _guard = if cli.verbose {
        crate::logging::init_logging_with_level("debug")?
    } else {
        crate::logging::init_logging_with_config(&config)?
    };
    debug!("Configuration loaded (index: {})", config.search.index);

    handle_query(&config, &query, out).await.map(|_| ())
}

/// Answer a single query
pub async fn handle_query<W: Write>(config: &AppConfig, query: &str, out: &mut W) -> Result<RagResponse> {
    let service = RagService::new(config)?;
    let response = service.query(query, out).await?;

    for (idx, source) in response.sources.iter().enumerate() {
        debug!(
            "Source {}: {} ({}) {}",
            idx + 1,
            source.filepath,
            source.id,
            truncate_str(&source.content, 80)
        );
    }

    Ok(response)
}
