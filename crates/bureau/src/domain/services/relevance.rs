//! Relevance - Text search scoring
//!
//! Every searchable entity is scored by its best matching category.
//! Matching is case-insensitive.

use std::borrow::Cow;

use serde::Serialize;

/// Exact (case-insensitive) title match
pub const SCORE_EXACT_TITLE: u32 = 100;
pub const SCORE_TITLE_PREFIX: u32 = 75;
pub const SCORE_TITLE_SUBSTRING: u32 = 50;
/// Query found in one of the tags
pub const SCORE_TAG: u32 = 25;
pub const SCORE_BODY: u32 = 10;

/// Entities that take part in text search
pub trait Searchable {
    fn title(&self) -> Cow<'_, str>;
    fn tags(&self) -> &[String];
    /// Description or other free text
    fn body(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored<T> {
    pub item: T,
    /// `None` when no query was given
    pub score: Option<u32>,
}

/// Best category score of `item` for an already lowercased, trimmed query
fn score_normalized<S: Searchable>(item: &S, needle: &str) -> Option<u32> {
    let title = item.title().to_lowercase();
    if title == needle {
        return Some(SCORE_EXACT_TITLE);
    }
    if title.starts_with(needle) {
        return Some(SCORE_TITLE_PREFIX);
    }
    if title.contains(needle) {
        return Some(SCORE_TITLE_SUBSTRING);
    }
    if item.tags().iter().any(|tag| tag.to_lowercase().contains(needle)) {
        return Some(SCORE_TAG);
    }
    match item.body() {
        Some(body) if body.to_lowercase().contains(needle) => Some(SCORE_BODY),
        _ => None,
    }
}

/// Score one item; `None` means no match
pub fn score<S: Searchable>(item: &S, query: &str) -> Option<u32> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    score_normalized(item, &needle)
}

/// Rank items by score, highest first; ties keep the incoming order.
/// An empty query returns everything unscored.
pub fn rank<S: Searchable>(items: Vec<S>, query: &str) -> Vec<Scored<S>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items
            .into_iter()
            .map(|item| Scored { item, score: None })
            .collect();
    }

    let mut scored: Vec<Scored<S>> = items
        .into_iter()
        .filter_map(|item| {
            score_normalized(&item, &needle).map(|s| Scored {
                item,
                score: Some(s),
            })
        })
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc {
        title: &'static str,
        tags: Vec<String>,
        body: Option<&'static str>,
    }

    impl Searchable for Doc {
        fn title(&self) -> Cow<'_, str> {
            Cow::Borrowed(self.title)
        }
        fn tags(&self) -> &[String] {
            &self.tags
        }
        fn body(&self) -> Option<&str> {
            self.body
        }
    }

    fn doc(title: &'static str, tags: &[&str], body: Option<&'static str>) -> Doc {
        Doc {
            title,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            body,
        }
    }

    #[test]
    fn test_categories_are_ordered() {
        let docs = vec![
            doc("Quarterly report", &[], Some("includes the invoice totals")),
            doc("Supplier list", &["invoice"], None),
            doc("Paid invoice", &[], None),
            doc("Invoice March", &[], None),
            doc("Invoice", &[], None),
        ];
        let ranked = rank(docs, "invoice");
        let order: Vec<(&str, Option<u32>)> =
            ranked.iter().map(|s| (s.item.title, s.score)).collect();
        assert_eq!(
            order,
            vec![
                ("Invoice", Some(100)),
                ("Invoice March", Some(75)),
                ("Paid invoice", Some(50)),
                ("Supplier list", Some(25)),
                ("Quarterly report", Some(10)),
            ]
        );
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let docs = vec![doc("Invoice March", &[], None), doc("Invoice April", &[], None)];
        let ranked = rank(docs, "INVOICE");
        assert_eq!(ranked[0].item.title, "Invoice March");
        assert_eq!(ranked[1].item.title, "Invoice April");
        assert!(ranked.iter().all(|s| s.score == Some(SCORE_TITLE_PREFIX)));
    }

    #[test]
    fn test_no_match_and_empty_query() {
        let docs = vec![doc("Invoice March", &[], None), doc("Invoice April", &[], None)];
        assert!(rank(docs, "xyz").is_empty());

        let docs = vec![doc("Invoice March", &[], None), doc("Invoice April", &[], None)];
        let all = rank(docs, "   ");
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|s| s.score.is_none()));
        assert_eq!(score(&doc("A", &[], None), ""), None);
    }
}
