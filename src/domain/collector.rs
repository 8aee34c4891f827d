use crate::domain::directory::{EntryStream, SearchItem};
use crate::domain::models::SearchResultSet;
use crate::error::DataStoreResult;
use tracing::debug;

/// Drain `stream`, keeping each entry's full DN in server order.
///
/// Referrals and intermediate responses carry no entry and are skipped. An
/// error part-way through is returned as-is; whatever was gathered up to that
/// point is dropped with it.
pub async fn collect_names(stream: &mut (dyn EntryStream + '_)) -> DataStoreResult<SearchResultSet> {
    let mut names = Vec::new();

    while let Some(item) = stream.next().await? {
        match item {
            SearchItem::Entry { dn } => names.push(dn),
            other => debug!("Skipping non-entry search result: {:?}", other),
        }
    }

    Ok(names)
}
