//! Text filtering over items.
use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};
use log::{debug, trace};

use crate::Item;

fn contains_term(field: Option<&str>, term: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(term))
}

/// Keeps the items whose title, name, author or domain contains `term`,
/// ignoring case. A blank term returns `items` unchanged.
pub fn filter_by_search_term<'a>(items: Vec<&'a Item>, term: &str) -> Vec<&'a Item> {
    if term.trim().is_empty() {
        return items;
    }
    let term = term.to_lowercase();

    items
        .into_iter()
        .filter(|item| {
            contains_term(item.title.as_deref(), &term)
                || contains_term(item.name.as_deref(), &term)
                || contains_term(item.auteur.as_deref(), &term)
                || contains_term(item.domaine.as_deref(), &term)
        })
        .collect()
}

/// Fuzzy search sorted by relevance, highest first.
///
/// Title or name matches count double; domain and description matches add
/// to the score. Ties keep the input order.
pub fn rank_by_relevance<'a, I>(items: I, query: &str) -> Vec<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let score = |field: Option<&str>| {
        field
            .and_then(|value| matcher.fuzzy_match(value, query))
            .unwrap_or(0)
    };

    let mut scored: Vec<(i64, &Item)> = items
        .into_iter()
        .filter_map(|item| {
            let final_score = score(Some(item.display_name())) * 2
                + score(item.domaine.as_deref())
                + score(item.description.as_deref());
            if final_score > 0 {
                trace!("Item matched with score {}: {}", final_score, item.id);
                Some((final_score, item))
            } else {
                None
            }
        })
        .collect();

    debug!("Found {} matching items before sorting", scored.len());
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn blank_term_returns_input() {
        let a = item(json!({"id": "a", "title": "Réseaux"}));
        let b = item(json!({"id": "b", "name": "Docker"}));
        let items = vec![&a, &b];
        assert_eq!(filter_by_search_term(items.clone(), "   "), items);
        assert_eq!(filter_by_search_term(items.clone(), ""), items);
    }

    #[test]
    fn matches_any_searchable_field() {
        let a = item(json!({"id": "a", "title": "Réseaux", "domaine": "Télécom"}));
        let b = item(json!({"id": "b", "name": "Docker", "auteur": "Ana"}));
        let c = item(json!({"id": "c", "title": "Bases", "description": "docker inside"}));

        let found = filter_by_search_term(vec![&a, &b, &c], "DOCK");
        assert_eq!(found, vec![&b]);

        let found = filter_by_search_term(vec![&a, &b, &c], "ana");
        assert_eq!(found, vec![&b]);

        let found = filter_by_search_term(vec![&a, &b, &c], "télé");
        assert_eq!(found, vec![&a]);
    }

    #[test]
    fn ranking_prefers_title_matches() {
        let a = item(json!({"id": "a", "title": "Bases", "description": "rust ownership"}));
        let b = item(json!({"id": "b", "title": "Rust ownership"}));

        let ranked = rank_by_relevance([&a, &b], "rust");
        assert_eq!(ranked.first().map(|i| i.id.as_str()), Some("b"));
        assert!(rank_by_relevance([&a, &b], "zzzz").is_empty());
    }
}
