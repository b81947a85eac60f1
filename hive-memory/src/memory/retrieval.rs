//! Ranked retrieval and keyword search.
//!
//! Both paths rank by importance, then by most recent access, truncate to
//! the limit and bump access bookkeeping on whatever they return. The caller
//! runs them inside one transaction so the read and the bump land together.

use hive_core::db::memory as rows;
use hive_core::types::{MemoryQueryFilter, MemoryRecord, MemoryType};
use rusqlite::Connection;

use super::traits::MemoryMatcher;

/// Lower-case a query and split it on whitespace.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Case-insensitive substring match on content or context.
///
/// Any single term is enough. No terms matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl MemoryMatcher for SubstringMatcher {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn is_match(&self, terms: &[String], record: &MemoryRecord) -> bool {
        if terms.is_empty() {
            return true;
        }

        let content = record.content.to_lowercase();
        let context = record.context.as_deref().map(str::to_lowercase);
        terms.iter().any(|term| {
            content.contains(term.as_str())
                || context.as_deref().is_some_and(|ctx| ctx.contains(term.as_str()))
        })
    }

    fn storage_terms(&self, terms: &[String]) -> Option<Vec<String>> {
        // SQLite lower() folds ASCII only
        terms.iter().all(|term| term.is_ascii()).then(|| terms.to_vec())
    }
}

/// Filtered listing with access bookkeeping.
pub(crate) fn retrieve(
    conn: &Connection,
    filter: &MemoryQueryFilter,
    now: i64,
) -> hive_core::Result<Vec<MemoryRecord>> {
    let mut records = rows::list_memories(conn, filter)?;
    touch_all(conn, &mut records, now)?;
    Ok(records)
}

/// Keyword search with access bookkeeping.
pub(crate) fn search(
    conn: &Connection,
    agent_id: &str,
    memory_type: Option<MemoryType>,
    terms: &[String],
    matcher: &dyn MemoryMatcher,
    limit: usize,
    now: i64,
) -> hive_core::Result<Vec<MemoryRecord>> {
    let mut filter = MemoryQueryFilter {
        memory_type,
        ..MemoryQueryFilter::for_agent(agent_id)
    };
    if let Some(text_terms) = matcher.storage_terms(terms) {
        filter.text_terms = text_terms;
        filter.limit = Some(limit);
    }

    // Candidates arrive ranked, so filtering preserves the order.
    let mut records: Vec<MemoryRecord> = rows::list_memories(conn, &filter)?
        .into_iter()
        .filter(|record| matcher.is_match(terms, record))
        .take(limit)
        .collect();

    touch_all(conn, &mut records, now)?;
    Ok(records)
}

/// Persist the access bump and mirror it on the returned records.
fn touch_all(conn: &Connection, records: &mut [MemoryRecord], now: i64) -> hive_core::Result<()> {
    for record in records.iter_mut() {
        rows::record_access(conn, record.id, now)?;
        record.access_count += 1;
        record.accessed_at = now;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::types::MemoryCategory;
    use std::collections::BTreeMap;

    fn record(content: &str, context: Option<&str>) -> MemoryRecord {
        MemoryRecord {
            id: 1,
            agent_id: "a".into(),
            memory_type: MemoryType::Episodic,
            memory_category: MemoryCategory::Conversation,
            content: content.into(),
            context: context.map(Into::into),
            tags: Vec::new(),
            importance: 0.5,
            confidence: 1.0,
            access_count: 0,
            created_at: 0,
            accessed_at: 0,
            last_consolidated: None,
            related_memories: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  Foo\tBAR  baz\n"), vec!["foo", "bar", "baz"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_any_term_matches() {
        let terms = tokenize("foo bar");
        assert!(SubstringMatcher.is_match(&terms, &record("contains FOO only", None)));
        assert!(!SubstringMatcher.is_match(&terms, &record("nothing here", None)));
    }

    #[test]
    fn test_matches_context() {
        let terms = tokenize("deploy");
        assert!(SubstringMatcher.is_match(&terms, &record("ran job", Some("Deploy pipeline"))));
        assert!(!SubstringMatcher.is_match(&terms, &record("ran job", None)));
    }

    #[test]
    fn test_substring_inside_word() {
        let terms = tokenize("log");
        assert!(SubstringMatcher.is_match(&terms, &record("checked the catalog", None)));
    }

    #[test]
    fn test_storage_terms_only_for_ascii() {
        assert_eq!(
            SubstringMatcher.storage_terms(&tokenize("Foo bar")),
            Some(vec!["foo".to_string(), "bar".to_string()])
        );
        assert_eq!(SubstringMatcher.storage_terms(&tokenize("café")), None);
        assert_eq!(SubstringMatcher.storage_terms(&[]), Some(Vec::new()));
    }

    #[test]
    fn test_search_non_ascii_term_falls_back() {
        let db = hive_core::Database::open_in_memory().unwrap();
        let agent_id = db.register_agent("a").unwrap().id;
        db.with_transaction(|tx| {
            for content in ["Dinner at the CAFÉ", "lunch at home"] {
                rows::insert_memory(tx, &hive_core::types::NewMemoryRecord {
                    agent_id: agent_id.clone(),
                    memory_type: MemoryType::Episodic,
                    memory_category: MemoryCategory::Conversation,
                    content: content.into(),
                    context: None,
                    tags: Vec::new(),
                    importance: 0.5,
                    confidence: 1.0,
                    created_at: 0,
                    related_memories: Vec::new(),
                    extensions: BTreeMap::new(),
                })?;
            }
            Ok::<_, hive_core::Error>(())
        })
        .unwrap();

        let found = db
            .with_transaction(|tx| search(tx, &agent_id, None, &tokenize("café"), &SubstringMatcher, 10, 1))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "Dinner at the CAFÉ");
        assert_eq!(found[0].access_count, 1);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(SubstringMatcher.is_match(&[], &record("anything", None)));
    }
}
