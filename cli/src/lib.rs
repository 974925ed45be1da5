use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use search_core::{
    process_queries, process_queries_joined, remove_duplicates, DocId, Document, DocumentStatus,
    ExecutionPolicy, RequestQueue, SearchServer,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Load documents into an in-memory TF-IDF index and query it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct CorpusArgs {
    /// Input path: a .jsonl/.json file or a directory of them
    #[arg(long)]
    pub input: PathBuf,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    pub stop_words: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank documents for each query and report how many queries found nothing
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Query text; repeat for several queries
        #[arg(long = "query", required = true)]
        queries: Vec<String>,
        /// Only rank documents with this status
        #[arg(long, default_value = "actual", value_parser = parse_status)]
        status: DocumentStatus,
        /// Only rank documents rated at least this much
        #[arg(long)]
        min_rating: Option<i32>,
        /// Fan ranking out over worker threads
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Results printed per page
        #[arg(long, default_value_t = 2)]
        page_size: usize,
    },
    /// Show which query words a document contains
    Match {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Run a file of queries (one per line) concurrently
    Batch {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        queries: PathBuf,
        /// Print one flat list instead of a list per query
        #[arg(long, default_value_t = false)]
        joined: bool,
    },
    /// Remove documents whose word set repeats a lower-id document
    Dedup {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

pub fn parse_status(s: &str) -> Result<DocumentStatus, String> {
    match s.to_ascii_lowercase().as_str() {
        "actual" => Ok(DocumentStatus::Actual),
        "irrelevant" => Ok(DocumentStatus::Irrelevant),
        "banned" => Ok(DocumentStatus::Banned),
        "removed" => Ok(DocumentStatus::Removed),
        other => Err(format!("unknown status {other:?}")),
    }
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Search { corpus, queries, status, min_rating, parallel, page_size } => {
            let server = load_server(&corpus)?;
            let policy = if parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };
            let predicate = move |_id: DocId, doc_status: DocumentStatus, rating: i32| {
                doc_status == status && min_rating.map_or(true, |min| rating >= min)
            };
            let mut requests = RequestQueue::new(&server).with_policy(policy);
            for query in &queries {
                let start = Instant::now();
                let found = requests.add_find_request_with(query, predicate)?;
                tracing::info!(
                    query = query.as_str(),
                    results = found.len(),
                    took_ms = start.elapsed().as_millis() as u64,
                    "search"
                );
                writeln!(out, "Results for {query:?}:")?;
                for page in paginate(&found, page_size) {
                    write!(out, "{page}")?;
                }
            }
            writeln!(out, "No-result requests: {}", requests.no_result_requests())?;
        }
        Commands::Match { corpus, query, id, parallel } => {
            let server = load_server(&corpus)?;
            let policy = if parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };
            let matched = server.match_document_with(policy, &query, id)?;
            writeln!(
                out,
                "{{ document_id = {id}, status = {:?}, words = [{}] }}",
                matched.status,
                matched.words.join(", ")
            )?;
        }
        Commands::Batch { corpus, queries, joined } => {
            let server = load_server(&corpus)?;
            let queries = read_queries(&queries)?;
            let start = Instant::now();
            if joined {
                for doc in process_queries_joined(&server, &queries)? {
                    writeln!(out, "{doc}")?;
                }
            } else {
                for (query, docs) in queries.iter().zip(process_queries(&server, &queries)?) {
                    writeln!(out, "{} documents for {query:?}", docs.len())?;
                    for doc in docs {
                        writeln!(out, "{doc}")?;
                    }
                }
            }
            tracing::info!(queries = queries.len(), took_ms = start.elapsed().as_millis() as u64, "batch");
        }
        Commands::Dedup { corpus } => {
            let mut server = load_server(&corpus)?;
            let before = server.document_count();
            let removed = remove_duplicates(&mut server);
            for id in &removed {
                writeln!(out, "Found duplicate document id {id}")?;
            }
            writeln!(out, "Documents: {before} -> {}", server.document_count())?;
        }
    }
    Ok(())
}

fn load_server(corpus: &CorpusArgs) -> Result<SearchServer> {
    let docs = load_documents(&corpus.input)?;
    let server = build_server(&corpus.stop_words, &docs)?;
    tracing::info!(num_docs = server.document_count(), "index loaded");
    Ok(server)
}

pub fn build_server(stop_words: &str, docs: &[InputDoc]) -> Result<SearchServer> {
    let mut server = SearchServer::from_stop_words_text(stop_words)?;
    for doc in docs {
        server
            .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
            .with_context(|| format!("adding document {}", doc.id))?;
    }
    Ok(server)
}

/// Read documents from a file, or from every .json/.jsonl file under a directory.
pub fn load_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        return Err(anyhow!("input {} does not exist", input.display()));
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), line_no + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}

/// One query per line; blank lines and lines starting with '#' are skipped.
pub fn read_queries(path: &Path) -> Result<Vec<String>> {
    let mut queries = Vec::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') { continue; }
        queries.push(trimmed.to_string());
    }
    Ok(queries)
}

/// Render documents in pages of `page_size` (at least one per page).
pub fn paginate(docs: &[Document], page_size: usize) -> Vec<String> {
    docs.chunks(page_size.max(1))
        .enumerate()
        .map(|(i, page)| {
            let mut s = format!("Page {}\n", i + 1);
            for doc in page {
                s.push_str(&doc.to_string());
                s.push('\n');
            }
            s
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginates_with_short_last_page() {
        let docs: Vec<Document> = (0..5).map(|id| Document::new(id, 0.5, 1)).collect();
        let pages = paginate(&docs, 2);
        assert_eq!(pages.len(), 3);
        assert!(pages[0].starts_with("Page 1\n{ document_id = 0"));
        assert_eq!(pages[2].lines().count(), 2);
        assert_eq!(paginate(&docs, 0).len(), 5);
        assert!(paginate(&[], 3).is_empty());
    }

    #[test]
    fn parses_statuses_case_insensitively() {
        assert_eq!(parse_status("BANNED"), Ok(DocumentStatus::Banned));
        assert!(parse_status("deleted").is_err());
    }

    #[test]
    fn input_doc_defaults() {
        let doc: InputDoc = serde_json::from_str(r#"{"id": 4, "text": "cat"}"#).unwrap();
        assert_eq!(doc.status, DocumentStatus::Actual);
        assert!(doc.ratings.is_empty());
    }
}
