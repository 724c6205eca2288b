//! Running many queries at once on the rayon pool.

use crate::error::Result;
use crate::server::SearchServer;
use crate::Document;
use rayon::prelude::*;

/// Top documents for every query, in query order. Fails if any query is
/// malformed.
pub fn process_queries<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|query| server.find_top_documents(query.as_ref()))
        .collect()
}

/// [`process_queries`] flattened into one list.
pub fn process_queries_joined<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}
