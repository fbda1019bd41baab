//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::build_search;
use crate::tools::SearchResult;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'callbrief doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let search = build_search(&settings)?
        .ok_or_else(|| anyhow::anyhow!("Web search is not configured"))?;

    let spinner = Output::spinner("Searching...");
    let result = search.search(query).await;
    spinner.finish_and_clear();

    match result? {
        SearchResult::Empty => Output::warning("No results found."),
        SearchResult::Hits(hits) => {
            Output::header(&format!("Results for \"{}\"", query));
            for hit in &hits {
                Output::list_item(&hit.title);
                println!("    {}", hit.link);
            }
        }
    }

    Ok(())
}
