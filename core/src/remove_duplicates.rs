use crate::document::DocId;
use crate::index::SearchServer;
use std::collections::HashSet;
use tracing::info;

/// Ids of documents whose set of words equals that of a lower-id document.
pub fn find_duplicates(server: &SearchServer) -> Vec<DocId> {
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    server
        .document_ids()
        .filter(|&id| !seen.insert(server.word_frequencies(id).into_keys().collect()))
        .collect()
}

/// Removes every duplicate, keeping the lowest id of each group. Returns the removed ids.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocId> {
    let duplicates = find_duplicates(server);
    for &document_id in &duplicates {
        info!(document_id, "Found duplicate document id");
        server.remove_document(document_id);
    }
    duplicates
}
