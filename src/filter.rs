use crate::models::FileRecord;

/// Derives the visible subsequence of the collection: a record is included
/// iff it carries the selected tag (when one is selected) and its name or
/// description contains the search term, case-folded. Relative order of the
/// input is preserved.
pub fn filter_records(
    records: &[FileRecord],
    selected_tag: Option<&str>,
    search_term: &str,
) -> Vec<FileRecord> {
    let needle = search_term.to_lowercase();
    records
        .iter()
        .filter(|record| matches_tag(record, selected_tag) && matches_search(record, &needle))
        .cloned()
        .collect()
}

fn matches_tag(record: &FileRecord, selected_tag: Option<&str>) -> bool {
    match selected_tag {
        Some(tag) => record.tags.iter().any(|candidate| candidate == tag),
        None => true,
    }
}

fn matches_search(record: &FileRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(needle) || record.description.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::filter_records;
    use crate::models::FileRecord;

    fn record(id: &str, name: &str, description: &str, tags: &[&str]) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            path: format!("/{id}"),
            description: description.to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<FileRecord> {
        vec![
            record("1", "Photo Editor", "edits raw photos", &["graphics", "tool"]),
            record("2", "Backup Script", "nightly backup", &["tool"]),
            record("3", "Game Save", "old game progress", &["game"]),
        ]
    }

    #[test]
    fn no_filters_is_identity() {
        let records = sample();
        assert_eq!(filter_records(&records, None, ""), records);
    }

    #[test]
    fn tag_and_search_are_anded() {
        let records = sample();
        let result = filter_records(&records, Some("tool"), "photo");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let records = sample();
        let by_name = filter_records(&records, None, "BACKUP");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "2");

        let by_description = filter_records(&records, None, "Progress");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "3");
    }

    #[test]
    fn output_preserves_input_order() {
        let records = sample();
        let result = filter_records(&records, Some("tool"), "");
        let ids: Vec<&str> = result.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn unknown_tag_yields_empty() {
        let records = sample();
        assert!(filter_records(&records, Some("missing"), "").is_empty());
    }
}
