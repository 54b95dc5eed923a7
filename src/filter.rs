use std::collections::BTreeMap;

use serde::Deserialize;

use crate::store::Entity;

/// Selection value meaning "do not filter on this field".
pub const ALL: &str = "all";

/// Free-text search plus categorical selections, as typed into a list header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl Query {
    pub fn matches<T: Entity>(&self, record: &T) -> bool {
        self.matches_text(record.search_fields()) && self.matches_filters(|k| record.category(k))
    }

    pub fn matches_text<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        fields
            .into_iter()
            .any(|f| f.to_lowercase().contains(&needle))
    }

    pub fn matches_filters<'a>(&self, category: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.filters.iter().all(|(key, want)| {
            let want = want.trim();
            want.is_empty() || want.eq_ignore_ascii_case(ALL) || category(key) == Some(want)
        })
    }

    /// Visible subset in store order. The store itself is not touched.
    pub fn apply<'a, T: Entity>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::people::{Parent, ParentDraft};
    use crate::store::EntityList;

    fn search(text: &str) -> Query {
        Query {
            text: text.to_string(),
            ..Query::default()
        }
    }

    fn filtered(text: &str, key: &str, value: &str) -> Query {
        let mut q = search(text);
        q.filters.insert(key.to_string(), value.to_string());
        q
    }

    fn parents() -> EntityList<Parent> {
        let mut list: EntityList<Parent> = EntityList::new();
        let now = crate::clock::now();
        list.insert(
            ParentDraft {
                name: "Rakesh Sharma".into(),
                email: "rakesh@school.edu".into(),
                phone: "+91 98765 43210".into(),
                ..ParentDraft::default()
            },
            now,
        )
        .expect("rakesh");
        let sunita = list
            .insert(
                ParentDraft {
                    name: "Sunita Patel".into(),
                    email: "sunita@school.edu".into(),
                    phone: "+91 98765 43213".into(),
                    ..ParentDraft::default()
                },
                now,
            )
            .expect("sunita");
        list.toggle_status(&sunita.id).expect("toggle");
        list
    }

    #[test]
    fn query_and_status_filter_combine() {
        let list = parents();
        let q = filtered("sharma", "status", "active");
        let hits = list.filter(&q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Rakesh Sharma");
    }

    #[test]
    fn empty_query_and_all_filter_return_everything() {
        let list = parents();
        let q = filtered("", "status", "all");
        assert_eq!(list.filter(&q).len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let list = parents();
        assert_eq!(list.filter(&search("SUNITA@")).len(), 1);
        assert_eq!(list.filter(&search("98765")).len(), 2);
        assert!(list.filter(&search("nobody")).is_empty());
    }

    #[test]
    fn unknown_filter_key_excludes_records() {
        let list = parents();
        let q = filtered("", "class", "10-A");
        assert!(list.filter(&q).is_empty());
    }

    #[test]
    fn status_filter_alone_selects_inactive() {
        let list = parents();
        let q = filtered("", "status", "inactive");
        let hits = list.filter(&q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sunita Patel");
    }
}
