//! `fetch-tool` command.

use crate::error::Result;
use crate::packager::{HttpFetcher, Settings, fetch_tool};

/// Downloads the packaging tool to its configured path.
pub async fn run(settings: &Settings) -> Result<i32> {
    fetch_tool(&HttpFetcher::new(), settings).await?;
    Ok(0)
}
