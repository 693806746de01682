//! Matching and ranking over the file index.

use std::sync::Arc;

use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::indexer::FileRecord;
use crate::query::snippet::{snippet_around, Snippet};
use crate::query::text_match;
use crate::query::{Combinator, Query};

/// Hard cap on published file results, matching what a result panel can
/// usefully display.
pub const MAX_FILE_RESULTS: usize = 500;

/// A ranked file match.
#[derive(Debug, Clone)]
pub struct FileMatch {
    pub record: Arc<FileRecord>,
    pub snippet: Option<Snippet>,
    pub score: i64,
}

/// How one token matched one file. A filename hit gates the match but
/// only extracted-text occurrences count toward the score.
struct TokenHit {
    content_count: usize,
}

fn token_hit(record: &FileRecord, token: &str) -> Option<TokenHit> {
    let name_count = text_match::count_ci(&record.file_name(), token);
    let content_count = record
        .extracted_text
        .as_deref()
        .map(|text| text_match::count_ci(text, token))
        .unwrap_or(0);
    if name_count + content_count == 0 {
        return None;
    }
    Some(TokenHit { content_count })
}

/// Evaluates one file against the query tokens with the query combinator.
/// Returns `None` when the file does not match.
fn match_file(record: &Arc<FileRecord>, tokens: &[String], combinator: Combinator) -> Option<FileMatch> {
    let hits: Vec<Option<TokenHit>> = tokens.iter().map(|t| token_hit(record, t)).collect();
    let matches = match combinator {
        Combinator::And => hits.iter().all(Option::is_some),
        Combinator::Or => hits.iter().any(Option::is_some),
    };
    if !matches {
        return None;
    }

    let mut total = 0usize;
    let mut snippet = None;
    for (token, hit) in tokens.iter().zip(&hits) {
        if let Some(hit) = hit {
            total += hit.content_count;
            if snippet.is_none() && hit.content_count > 0 {
                snippet = record
                    .extracted_text
                    .as_deref()
                    .and_then(|text| snippet_around(text, token));
            }
        }
    }

    // exact filename-stem match outranks everything else
    let stem = record.file_stem();
    let exact = tokens
        .iter()
        .any(|token| stem == token.to_lowercase());
    let score = if exact {
        1_000_000 + total as i64
    } else {
        total as i64
    };
    Some(FileMatch {
        record: Arc::clone(record),
        snippet,
        score,
    })
}

/// Ranks all cached records against the query's filename tokens. Ordering:
/// score descending, newer files first on ties, then path for stability.
/// Output is capped at [`MAX_FILE_RESULTS`]. Returns `None` if cancelled.
pub fn search_files(
    records: &[Arc<FileRecord>],
    query: &Query,
    cancel: &CancellationToken,
) -> Option<Vec<FileMatch>> {
    let tokens = query.filename_tokens();
    if tokens.is_empty() {
        return Some(Vec::new());
    }

    let mut matches: Vec<FileMatch> = records
        .par_iter()
        .filter_map(|record| {
            cancel.is_cancelled()?;
            match_file(record, &tokens, query.combinator)
        })
        .collect();
    // a cancelled scan may have skipped records, never publish it
    cancel.is_cancelled()?;

    matches.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.record.modified.cmp(&a.record.modified))
            .then_with(|| a.record.path.cmp(&b.record.path))
    });
    matches.truncate(MAX_FILE_RESULTS);
    Some(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FileFormat;
    use std::path::PathBuf;

    fn record(path: &str, modified: u64, text: Option<&str>) -> Arc<FileRecord> {
        Arc::new(FileRecord {
            path: PathBuf::from(path),
            format: FileFormat::Text,
            modified,
            content_hash: [0; 32],
            extracted_text: text.map(String::from),
            extraction_failed: false,
        })
    }

    fn word_query(word: &str) -> Query {
        Query {
            free_word: Some(word.into()),
            ..Query::default()
        }
    }

    #[test]
    fn filename_and_content_both_match() {
        let records = vec![
            record("/data/report.txt", 1, Some("quarterly numbers")),
            record("/data/numbers.txt", 2, Some("nothing here")),
            record("/data/other.txt", 3, Some("irrelevant")),
        ];
        let found = search_files(&records, &word_query("numbers"), &CancellationToken::noop())
            .expect("not cancelled");
        assert_eq!(found.len(), 2);
        // exact stem match ranks first
        assert_eq!(found[0].record.path, PathBuf::from("/data/numbers.txt"));
        assert!(found[1].snippet.is_some());
    }

    #[test]
    fn and_combinator_requires_all_tokens() {
        let records = vec![
            record("/d/a.txt", 1, Some("alpha beta")),
            record("/d/b.txt", 1, Some("alpha only")),
        ];
        let mut query = Query {
            free_word: Some("alpha".into()),
            conditions: vec![crate::query::AttributeCondition::new(
                "any",
                crate::query::ConditionOp::Contains("beta".into()),
            )],
            combinator: Combinator::And,
            ..Query::default()
        };
        let found =
            search_files(&records, &query, &CancellationToken::noop()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.path, PathBuf::from("/d/a.txt"));

        query.combinator = Combinator::Or;
        let found = search_files(&records, &query, &CancellationToken::noop()).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn score_counts_content_occurrences_only() {
        let records = vec![
            record("/d/term_notes.txt", 1, Some("no hits in this text")),
            record("/d/summary.txt", 1, Some("term appears, then term again")),
        ];
        let found = search_files(&records, &word_query("term"), &CancellationToken::noop())
            .expect("not cancelled");
        assert_eq!(found.len(), 2);
        // two content occurrences outrank a filename-only match
        assert_eq!(found[0].record.path, PathBuf::from("/d/summary.txt"));
        assert_eq!(found[0].score, 2);
        assert_eq!(found[1].score, 0);
    }

    #[test]
    fn ties_break_by_mtime_then_path() {
        let records = vec![
            record("/d/old.txt", 1, Some("term")),
            record("/d/new.txt", 5, Some("term")),
        ];
        let found = search_files(&records, &word_query("term"), &CancellationToken::noop()).unwrap();
        assert_eq!(found[0].record.path, PathBuf::from("/d/new.txt"));
    }

    #[test]
    fn cap_applies() {
        let records: Vec<_> = (0..600)
            .map(|i| record(&format!("/d/f{i:04}.txt"), 0, Some("term")))
            .collect();
        let found = search_files(&records, &word_query("term"), &CancellationToken::noop()).unwrap();
        assert_eq!(found.len(), MAX_FILE_RESULTS);
    }
}
