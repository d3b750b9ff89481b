//! Text matching for the local engine.
//!
//! Two strategies back the engine's search modes:
//!
//! - **FullTextIndex**: in-memory tantivy index, BM25 ranking
//! - **jaccard**: token-set overlap, used when full text is off

use crate::core::error::{GeoError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Mutex;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid token regex"));

/// Indexing heap for the single writer thread
const WRITER_HEAP_BYTES: usize = 20_000_000;

/// Lowercased word tokens (Unicode aware, so Arabic splits too)
pub fn tokenize(text: &str) -> HashSet<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// |A ∩ B| / |A ∪ B|, zero when both are empty
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// BM25 index over address text, keyed by a caller-chosen u64
pub struct FullTextIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    text_field: Field,
    key_field: Field,
}

impl FullTextIndex {
    pub fn new() -> Result<Self> {
        let mut builder = Schema::builder();
        let text_field = builder.add_text_field("text", TEXT);
        let key_field = builder.add_u64_field("key", STORED);
        let index = Index::create_in_ram(builder.build());

        let writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_HEAP_BYTES)
            .map_err(|e| GeoError::SearchFailed(format!("Failed to create writer: {e}")))?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| GeoError::SearchFailed(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            text_field,
            key_field,
        })
    }

    /// Add documents and make them searchable
    ///
    /// All or nothing: on failure the uncommitted documents are rolled back.
    pub fn add<I>(&self, docs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (u64, String)>,
    {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        match self.write_and_commit(&mut writer, docs) {
            Ok(added) => {
                self.reload()?;
                Ok(added)
            }
            Err(e) => {
                if let Err(rollback) = writer.rollback() {
                    tracing::warn!("Failed to roll back index writer: {}", rollback);
                }
                Err(e)
            }
        }
    }

    /// Remove every document
    pub fn clear(&self) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer
            .delete_all_documents()
            .map_err(|e| GeoError::SearchFailed(format!("Failed to clear index: {e}")))?;
        writer
            .commit()
            .map_err(|e| GeoError::SearchFailed(format!("Failed to commit: {e}")))?;
        self.reload()
    }

    fn write_and_commit<I>(&self, writer: &mut IndexWriter, docs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (u64, String)>,
    {
        let (text_field, key_field) = (self.text_field, self.key_field);
        let mut added = 0;
        for (key, text) in docs {
            writer
                .add_document(doc!(
                    text_field => text,
                    key_field => key
                ))
                .map_err(|e| GeoError::SearchFailed(format!("Failed to add document: {e}")))?;
            added += 1;
        }

        writer
            .commit()
            .map_err(|e| GeoError::SearchFailed(format!("Failed to commit: {e}")))?;
        Ok(added)
    }

    fn reload(&self) -> Result<()> {
        self.reader
            .reload()
            .map_err(|e| GeoError::SearchFailed(format!("Failed to reload reader: {e}")))
    }

    /// Top `limit` keys by BM25 score
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<(u64, f32)>> {
        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(&self.index, vec![self.text_field]);
        // Lenient: address text is free-form and may contain query syntax
        let (parsed, _errors) = parser.parse_query_lenient(query);

        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(limit.max(1)))
            .map_err(|e| GeoError::SearchFailed(format!("Search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address).map_err(|e| {
                GeoError::SearchFailed(format!("Failed to retrieve document: {e}"))
            })?;
            if let Some(key) = doc.get_first(self.key_field).and_then(|v| v.as_u64()) {
                hits.push((key, score));
            }
        }

        Ok(hits)
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}
