use crate::concurrent_map::ConcurrentMap;
use crate::config::{DEFAULT_BUCKET_COUNT, MAX_RESULT_DOCUMENT_COUNT};
use crate::document::{compute_average_rating, DocId, Document, DocumentStatus};
use crate::error::{Error, Result};
use crate::policy::{DocumentPredicate, ExecutionPolicy};
use crate::query::Query;
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};
use rayon::prelude::*;
use std::collections::{btree_map, BTreeMap, HashMap};
use tracing::debug;

/// Handle into the word intern table.
pub type TermId = u32;

type Postings = BTreeMap<DocId, f64>;

#[derive(Debug, Clone, Copy)]
struct DocumentInfo {
    rating: i32,
    status: DocumentStatus,
}

/// Words of a query found in a document, plus the document's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDocument<'a> {
    /// Sorted plus words present in the document; empty when a minus word matched.
    pub words: Vec<&'a str>,
    pub status: DocumentStatus,
}

/// In-memory TF-IDF index.
///
/// Every distinct word is interned once in `terms`/`dictionary`; the posting
/// lists and per-document word maps refer to words by [`TermId`]. Posting
/// lists stay allocated (possibly empty) after their last document is removed.
#[derive(Debug, Default)]
pub struct SearchServer {
    stop_words: StopWords,
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    /// term id -> (document id -> term frequency)
    postings: Vec<Postings>,
    /// document id -> (term id -> term frequency)
    doc_words: BTreeMap<DocId, BTreeMap<TermId, f64>>,
    documents: BTreeMap<DocId, DocumentInfo>,
}

impl SearchServer {
    pub fn new() -> Self { Self::default() }

    /// Fails if any stop word contains a control character.
    pub fn with_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self { stop_words: StopWords::new(stop_words)?, ..Self::default() })
    }

    /// Stop words given as a space-separated string.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Self::with_stop_words(split_into_words(text))
    }

    pub fn stop_words(&self) -> &StopWords { &self.stop_words }

    pub fn add_document(
        &mut self,
        document_id: DocId,
        document: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if document_id < 0 {
            return Err(Error::InvalidDocumentId(document_id));
        }
        if self.documents.contains_key(&document_id) {
            return Err(Error::DuplicateDocumentId(document_id));
        }
        // Validate everything before touching the index
        let words = self.split_into_words_no_stop(document)?;

        let mut word_freqs: BTreeMap<TermId, f64> = BTreeMap::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in &words {
                let term = self.intern(word);
                *word_freqs.entry(term).or_insert(0.0) += inv_word_count;
            }
        }
        for (&term, &freq) in &word_freqs {
            self.postings[term as usize].insert(document_id, freq);
        }
        let rating = compute_average_rating(ratings);
        debug!(document_id, words = word_freqs.len(), rating, ?status, "added document");
        self.doc_words.insert(document_id, word_freqs);
        self.documents.insert(document_id, DocumentInfo { rating, status });
        Ok(())
    }

    pub fn document_count(&self) -> usize { self.documents.len() }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> DocumentIds<'_> {
        DocumentIds(self.documents.keys())
    }

    /// Word -> term frequency for a live document; empty for an unknown id.
    pub fn word_frequencies(&self, document_id: DocId) -> BTreeMap<&str, f64> {
        self.doc_words
            .get(&document_id)
            .map(|words| {
                words
                    .iter()
                    .map(|(&term, &freq)| (self.terms[term as usize].as_str(), freq))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Document id -> term frequency for `word`, if the word was ever indexed.
    pub fn word_postings(&self, word: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.dictionary.get(word).map(|&term| &self.postings[term as usize])
    }

    pub fn remove_document(&mut self, document_id: DocId) {
        self.remove_document_with(ExecutionPolicy::Sequential, document_id);
    }

    /// No-op for an id that is not live.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, document_id: DocId) {
        if self.documents.remove(&document_id).is_none() {
            return;
        }
        let word_freqs = self.doc_words.remove(&document_id).unwrap_or_default();
        match policy {
            ExecutionPolicy::Sequential => {
                for &term in word_freqs.keys() {
                    self.postings[term as usize].remove(&document_id);
                }
            }
            ExecutionPolicy::Parallel => {
                let terms: Vec<usize> = word_freqs.keys().map(|&term| term as usize).collect();
                disjoint_mut(&mut self.postings, &terms)
                    .into_par_iter()
                    .for_each(|postings| {
                        postings.remove(&document_id);
                    });
            }
        }
        debug!(document_id, words = word_freqs.len(), ?policy, "removed document");
    }

    pub fn parse_query<'q>(&self, text: &'q str) -> Result<Query<'q>> {
        Query::parse(text, &self.stop_words)
    }

    /// Top documents with `Actual` status.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, DocumentStatus::Actual)
    }

    /// Ranked by descending relevance (ties within epsilon by descending rating),
    /// truncated to [`MAX_RESULT_DOCUMENT_COUNT`].
    pub fn find_top_documents_with<P: DocumentPredicate>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>> {
        let query = self.parse_query(raw_query)?;
        let mut matched = self.find_all_documents(policy, &query, &predicate);
        match policy {
            ExecutionPolicy::Sequential => matched.sort_by(|lhs, rhs| rhs.rank_cmp(lhs)),
            ExecutionPolicy::Parallel => matched.par_sort_by(|lhs, rhs| rhs.rank_cmp(lhs)),
        }
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        debug!(raw_query, results = matched.len(), ?policy, "found top documents");
        Ok(matched)
    }

    /// Every accepted document carrying a plus word and no minus word, in ascending id order.
    pub fn find_all_documents<P: DocumentPredicate>(
        &self,
        policy: ExecutionPolicy,
        query: &Query<'_>,
        predicate: &P,
    ) -> Vec<Document> {
        let relevance = match policy {
            ExecutionPolicy::Sequential => self.relevance_sequential(query, predicate),
            ExecutionPolicy::Parallel => self.relevance_parallel(query, predicate),
        };
        relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                self.documents.get(&id).map(|info| Document::new(id, relevance, info.rating))
            })
            .collect()
    }

    fn relevance_sequential<P: DocumentPredicate>(
        &self,
        query: &Query<'_>,
        predicate: &P,
    ) -> BTreeMap<DocId, f64> {
        let mut relevance = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = self.live_postings(word) else { continue };
            let idf = self.inverse_document_freq(postings);
            for (&id, &term_freq) in postings {
                if self.accepts(predicate, id) {
                    *relevance.entry(id).or_insert(0.0) += term_freq * idf;
                }
            }
        }
        for word in &query.minus_words {
            let Some(postings) = self.live_postings(word) else { continue };
            for id in postings.keys() {
                relevance.remove(id);
            }
        }
        relevance
    }

    fn relevance_parallel<P: DocumentPredicate>(
        &self,
        query: &Query<'_>,
        predicate: &P,
    ) -> BTreeMap<DocId, f64> {
        let relevance: ConcurrentMap<DocId, f64> =
            ConcurrentMap::new(query.plus_words.len().max(DEFAULT_BUCKET_COUNT));
        query.plus_words.par_iter().for_each(|word| {
            let Some(postings) = self.live_postings(word) else { return };
            let idf = self.inverse_document_freq(postings);
            for (&id, &term_freq) in postings {
                if self.accepts(predicate, id) {
                    *relevance.access(id) += term_freq * idf;
                }
            }
        });
        query.minus_words.par_iter().for_each(|word| {
            let Some(postings) = self.live_postings(word) else { return };
            for &id in postings.keys() {
                relevance.erase(id);
            }
        });
        relevance.into_ordinary_map()
    }

    pub fn match_document(&self, raw_query: &str, document_id: DocId) -> Result<MatchedDocument<'_>> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, document_id)
    }

    /// Fails with [`Error::DocumentNotFound`] for an id that is not live.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        document_id: DocId,
    ) -> Result<MatchedDocument<'_>> {
        let (Some(info), Some(doc_words)) =
            (self.documents.get(&document_id), self.doc_words.get(&document_id))
        else {
            return Err(Error::DocumentNotFound(document_id));
        };
        let query = self.parse_query(raw_query)?;
        let status = info.status;
        let in_document = |word: &&str| self.term_in(word, doc_words);

        let excluded = match policy {
            ExecutionPolicy::Sequential => query.minus_words.iter().any(|w| in_document(w).is_some()),
            ExecutionPolicy::Parallel => query.minus_words.par_iter().any(|w| in_document(w).is_some()),
        };
        if excluded {
            return Ok(MatchedDocument { words: Vec::new(), status });
        }

        let words: Vec<&str> = match policy {
            ExecutionPolicy::Sequential => query.plus_words.iter().filter_map(in_document).collect(),
            ExecutionPolicy::Parallel => {
                let mut words: Vec<&str> = query.plus_words.par_iter().filter_map(in_document).collect();
                words.par_sort_unstable();
                words.dedup();
                words
            }
        };
        Ok(MatchedDocument { words, status })
    }

    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(Error::InvalidWord(word.to_owned()));
            }
            if !self.stop_words.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }

    fn intern(&mut self, word: &str) -> TermId {
        if let Some(&term) = self.dictionary.get(word) {
            return term;
        }
        let term = self.terms.len() as TermId;
        self.dictionary.insert(word.to_owned(), term);
        self.terms.push(word.to_owned());
        self.postings.push(Postings::new());
        term
    }

    /// Posting list of a word that at least one live document carries.
    fn live_postings(&self, word: &str) -> Option<&Postings> {
        self.word_postings(word).filter(|postings| !postings.is_empty())
    }

    /// The interned spelling of `word` if the document carries it.
    fn term_in(&self, word: &str, doc_words: &BTreeMap<TermId, f64>) -> Option<&str> {
        let &term = self.dictionary.get(word)?;
        doc_words.contains_key(&term).then(|| self.terms[term as usize].as_str())
    }

    fn inverse_document_freq(&self, postings: &Postings) -> f64 {
        (self.documents.len() as f64 / postings.len() as f64).ln()
    }

    fn accepts<P: DocumentPredicate>(&self, predicate: &P, document_id: DocId) -> bool {
        self.documents
            .get(&document_id)
            .is_some_and(|info| predicate.accepts(document_id, info.status, info.rating))
    }
}

/// Mutable references to the elements at `sorted_indices`, which must be strictly ascending.
fn disjoint_mut<'a, T>(mut slice: &'a mut [T], sorted_indices: &[usize]) -> Vec<&'a mut T> {
    let mut out = Vec::with_capacity(sorted_indices.len());
    let mut offset = 0;
    for &index in sorted_indices {
        let rest = std::mem::take(&mut slice);
        let Some((item, tail)) = rest.get_mut(index - offset..).and_then(<[T]>::split_first_mut) else {
            break;
        };
        out.push(item);
        slice = tail;
        offset = index + 1;
    }
    out
}

/// Ascending iterator over live document ids.
pub struct DocumentIds<'a>(btree_map::Keys<'a, DocId, DocumentInfo>);

impl Iterator for DocumentIds<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> { self.0.next().copied() }

    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl DoubleEndedIterator for DocumentIds<'_> {
    fn next_back(&mut self) -> Option<DocId> { self.0.next_back().copied() }
}

impl ExactSizeIterator for DocumentIds<'_> {}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocId;
    type IntoIter = DocumentIds<'a>;

    fn into_iter(self) -> DocumentIds<'a> { self.document_ids() }
}
