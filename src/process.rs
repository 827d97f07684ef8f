use chrono::Local;
use log::{info, warn};
use tokio::time::sleep;

use crate::config::Config;
use crate::filter::KeywordFilter;
use crate::merge::merge_and_persist;
use crate::paginate::fetch_combination;
use crate::request::PageSource;
use crate::{info_time, Result};

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub combinations: usize,
    pub fetched: usize,
    pub matched: usize,
    /// Rows in the rewritten outputs, `None` when nothing matched and the
    /// outputs were left untouched.
    pub written: Option<usize>,
}

/// Sweeps every configured (region, bracket) pair one after the other,
/// keeps the records whose industry class matches a keyword and, once the
/// sweep is done, merges them into the persisted outputs.
///
/// Fails before any request if `config` does not validate.
pub async fn process_registry<S>(config: &Config, source: &S) -> Result<RunSummary>
where
    S: PageSource + ?Sized,
{
    config.validate()?;
    let start_time = Local::now();
    let mut summary = RunSummary::default();

    let filter = KeywordFilter::new(config.keywords.as_slice());
    if filter.is_empty() {
        warn!("No keywords configured, no record can match. Skipping the sweep.");
        return Ok(summary);
    }

    let mut matched = Vec::new();

    for region in &config.regions {
        for bracket in &config.brackets {
            // Keep successive requests spaced across combinations too.
            if summary.combinations > 0 {
                sleep(config.request_delay()).await;
            }
            summary.combinations += 1;

            info!("Querying region {region}, bracket {bracket}");
            let records =
                fetch_combination(source, config, region, &config.municipality, bracket).await;
            if records.is_empty() {
                continue;
            }
            summary.fetched += records.len();

            let kept = filter.apply(records);
            if !kept.is_empty() {
                info!(
                    "{} records match for region {region}, bracket {bracket}",
                    kept.len()
                );
                matched.extend(kept);
            }
        }
    }
    summary.matched = matched.len();
    info_time!(
        start_time,
        "Finished querying {} combinations: {} fetched, {} matched",
        summary.combinations,
        summary.fetched,
        summary.matched
    );

    if matched.is_empty() {
        info!("No records found for the configured industries and brackets.");
        return Ok(summary);
    }

    let dataset = merge_and_persist(matched, &config.output)?;
    summary.written = Some(dataset.len());
    Ok(summary)
}
