use crate::models::FileRecord;
use std::collections::BTreeSet;

/// Distinct union of every record's tags, lexicographically ascending.
pub fn all_tags(records: &[FileRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.tags.iter().map(String::as_str))
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// The `limit` most frequent tags across the collection, ordered by
/// descending count. Ties keep first-encountered order: counting walks the
/// collection front to back and the sort is stable.
pub fn frequent_tags(records: &[FileRecord], limit: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in records {
        for tag in &record.tags {
            match counts.iter_mut().find(|(name, _)| *name == tag.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag.as_str(), 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(tag, _)| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{all_tags, frequent_tags};
    use crate::models::FileRecord;

    fn with_tags(id: &str, tags: &[&str]) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: id.to_string(),
            path: format!("/{id}"),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn all_tags_is_sorted_and_distinct() {
        let records = vec![
            with_tags("1", &["zebra", "apple"]),
            with_tags("2", &["apple", "mango"]),
        ];
        assert_eq!(all_tags(&records), vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn all_tags_of_empty_collection_is_empty() {
        assert!(all_tags(&[]).is_empty());
    }

    #[test]
    fn frequent_tags_orders_by_count_descending() {
        let records = vec![
            with_tags("1", &["a", "b"]),
            with_tags("2", &["b", "c"]),
            with_tags("3", &["b", "c"]),
        ];
        assert_eq!(frequent_tags(&records, 5), vec!["b", "c", "a"]);
    }

    #[test]
    fn frequent_tags_truncates_to_limit() {
        let records = vec![with_tags("1", &["a", "b", "c", "d", "e", "f", "g"])];
        assert_eq!(frequent_tags(&records, 5).len(), 5);
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let records = vec![with_tags("1", &["later", "sooner"]), with_tags("2", &["other"])];
        // All counts are 1, so the counting pass order decides.
        assert_eq!(frequent_tags(&records, 3), vec!["later", "sooner", "other"]);
    }

    #[test]
    fn every_frequent_tag_appears_in_all_tags() {
        let records = vec![with_tags("1", &["x", "y"]), with_tags("2", &["y"])];
        let all = all_tags(&records);
        for tag in frequent_tags(&records, 5) {
            assert!(all.contains(&tag));
        }
    }
}
