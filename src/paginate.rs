use chrono::Local;
use log::{debug, error, info};
use tokio::time::sleep;

use crate::config::Config;
use crate::request::{PageSource, QueryKey};
use crate::{info_time, Record};

/// Downloads every record of one (region, municipality, bracket) combination
/// in windows of `config.page_size`.
///
/// Stops on the first short page, after `config.max_empty_pages` empty pages
/// in a row, or on the first failed request. A failure is logged and whatever
/// was accumulated until then is returned; the combination is not retried.
/// A zero `page_size` would never advance, so nothing is requested at all.
pub async fn fetch_combination<S>(
    source: &S,
    config: &Config,
    region: &str,
    municipality: &str,
    bracket: &str,
) -> Vec<Record>
where
    S: PageSource + ?Sized,
{
    let start_time = Local::now();
    let page_size = config.page_size;
    if page_size == 0 {
        error!("Page size is 0, skipping {region}-{municipality}-{bracket}");
        return Vec::new();
    }
    let mut total = Vec::new();
    let mut start = 1;
    let mut consecutive_empty = 0;

    loop {
        let key = QueryKey::window(region, municipality, bracket, start, page_size);
        let page = match source.fetch_page(&key).await {
            Ok(page) => page,
            Err(e) => {
                error!("Request for {key} failed, abandoning combination: {e}");
                break;
            }
        };

        if page.is_empty() {
            consecutive_empty += 1;
            debug!("Empty page {key} ({consecutive_empty} in a row)");
            if consecutive_empty >= config.max_empty_pages {
                break;
            }
        } else {
            let short_page = page.len() < page_size;
            debug!("Page {key}: {} records", page.len());
            total.extend(page);
            consecutive_empty = 0;
            if short_page {
                break;
            }
        }

        start += page_size;
        sleep(config.request_delay()).await;
    }

    if !total.is_empty() {
        info_time!(
            start_time,
            "Fetched {} records for {region}-{municipality}-{bracket}",
            total.len()
        );
    } else {
        info!("No records for {region}-{municipality}-{bracket}");
    }
    total
}
