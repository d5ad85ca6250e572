//! Deduplicator (spec §4.7), ported from `_deduplicate_results`:
//! first-occurrence-wins by `source_document_id`; candidates with no
//! `source_document_id` are never deduplicated against each other and
//! are always kept. Order is otherwise preserved.

use std::collections::HashSet;

use assistsupport_core::CandidateResult;

pub fn deduplicate(candidates: Vec<CandidateResult>) -> Vec<CandidateResult> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match &candidate.source_document_id {
            Some(doc_id) => {
                if seen.insert(doc_id.clone()) {
                    out.push(candidate);
                }
            }
            None => out.push(candidate),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistsupport_core::Category;
    use uuid::Uuid;

    fn candidate(source_document_id: Option<&str>) -> CandidateResult {
        CandidateResult {
            article_id: Uuid::new_v4(),
            title: String::new(),
            content: String::new(),
            category: Category::Reference,
            source_document_id: source_document_id.map(String::from),
            heading_path: None,
            bm25_score: 0.0,
            vector_score: 0.0,
            fusion_score: 0.0,
            rerank_score: None,
            quality_score: 1.0,
            category_boosted: false,
        }
    }

    #[test]
    fn keeps_first_occurrence_per_source_document() {
        let first = candidate(Some("doc-1"));
        let first_id = first.article_id;
        let candidates = vec![first, candidate(Some("doc-1")), candidate(Some("doc-2"))];

        let deduped = deduplicate(candidates);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].article_id, first_id);
    }

    #[test]
    fn never_deduplicates_null_source_document_ids() {
        let candidates = vec![candidate(None), candidate(None), candidate(None)];
        assert_eq!(deduplicate(candidates).len(), 3);
    }
}
