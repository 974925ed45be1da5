use crate::document::Document;
use crate::error::Result;
use crate::index::SearchServer;
use rayon::prelude::*;

/// Runs a sequential top-documents search per query, queries in parallel.
/// Results follow the input order; the first failing query aborts the batch.
pub fn process_queries<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    queries.par_iter().map(|query| server.find_top_documents(query.as_ref())).collect()
}

/// Like [`process_queries`], with all results concatenated in query order.
pub fn process_queries_joined<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}
