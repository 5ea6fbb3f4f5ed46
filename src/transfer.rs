use crate::errors::{AppError, AppResult};
use crate::models::{normalize_tags, FileRecord};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use uuid::Uuid;

pub const EXPORT_FILE_NAME: &str = "database.xlsx";

const SHEET_NAME: &str = "Files";
const COLUMNS: [&str; 8] = [
    "id",
    "name",
    "path",
    "description",
    "installationNotes",
    "imageUrl",
    "password",
    "tags",
];

/// Writes the full collection to a single-sheet workbook. Tags are flattened
/// to one comma-and-space-joined string column.
pub fn write_workbook(records: &[FileRecord], path: &Path) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(SHEET_NAME)
        .map_err(|error| AppError::Io(error.to_string()))?;

    for (col, header) in COLUMNS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .map_err(|error| AppError::Io(error.to_string()))?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        let cells = [
            record.id.as_str(),
            record.name.as_str(),
            record.path.as_str(),
            record.description.as_str(),
            record.installation_notes.as_str(),
            record.image_url.as_str(),
            record.password.as_str(),
            &record.tags.join(", "),
        ];
        for (col, value) in cells.iter().enumerate() {
            sheet
                .write_string(row, col as u16, *value)
                .map_err(|error| AppError::Io(error.to_string()))?;
        }
    }

    workbook
        .save(path)
        .map_err(|error| AppError::Io(error.to_string()))?;
    Ok(())
}

/// Parses the first sheet of an .xlsx/.xls workbook into records. Columns are
/// matched by header name; every absent field defaults to empty, the tag cell
/// is split on commas and trimmed, and rows without a usable id get a minted
/// fallback. An unparseable document fails the whole import.
pub fn read_workbook(path: &Path) -> AppResult<Vec<FileRecord>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|error| AppError::ImportParse(error.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::ImportParse("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|error| AppError::ImportParse(error.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(cell_text).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    let mut seen_ids: Vec<String> = Vec::new();
    for cells in rows {
        let field = |name: &str| -> String {
            header
                .iter()
                .position(|column| column == name)
                .and_then(|index| cells.get(index))
                .map(cell_text)
                .unwrap_or_default()
        };

        let mut id = field("id");
        if id.is_empty() || seen_ids.contains(&id) {
            id = Uuid::new_v4().to_string();
        }
        seen_ids.push(id.clone());

        let raw_tags = field("tags");
        let tags = normalize_tags(raw_tags.split(',').map(str::to_string).collect());

        records.push(FileRecord {
            id,
            name: field("name"),
            path: field("path"),
            description: field("description"),
            installation_notes: field("installationNotes"),
            image_url: field("imageUrl"),
            password: field("password"),
            tags,
        });
    }
    Ok(records)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Bool(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => {
            // Spreadsheet tools store whole numbers as floats; keep ids like
            // "1699999999999" free of a trailing ".0".
            if value.fract() == 0.0 && value.abs() < 9.0e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{read_workbook, write_workbook, EXPORT_FILE_NAME};
    use crate::models::FileRecord;
    use rust_xlsxwriter::Workbook;

    fn record(id: &str, name: &str, tags: &[&str]) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            path: format!("/{name}"),
            description: format!("{name} description"),
            installation_notes: "unzip and run".to_string(),
            image_url: String::new(),
            password: "hunter2".to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }

    #[test]
    fn export_then_import_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(EXPORT_FILE_NAME);
        let records = vec![
            record("1", "alpha", &["x", "y"]),
            record("2", "beta", &[]),
        ];

        write_workbook(&records, &path).expect("write");
        let imported = read_workbook(&path).expect("read");
        assert_eq!(imported, records);
    }

    #[test]
    fn missing_tags_column_yields_empty_tag_sets() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("partial.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "name").expect("header");
        sheet.write_string(0, 1, "path").expect("header");
        sheet.write_string(1, 0, "orphan").expect("cell");
        sheet.write_string(1, 1, "/orphan").expect("cell");
        workbook.save(&path).expect("save");

        let imported = read_workbook(&path).expect("read");
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].name, "orphan");
        assert!(imported[0].tags.is_empty());
        assert!(!imported[0].id.is_empty(), "fallback id must be minted");
    }

    #[test]
    fn duplicate_ids_are_reassigned() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dupes.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["id", "name", "path"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).expect("header");
        }
        for row in 1..=2u32 {
            sheet.write_string(row, 0, "same").expect("cell");
            sheet.write_string(row, 1, "entry").expect("cell");
            sheet.write_string(row, 2, "/entry").expect("cell");
        }
        workbook.save(&path).expect("save");

        let imported = read_workbook(&path).expect("read");
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].id, "same");
        assert_ne!(imported[1].id, "same");
    }

    #[test]
    fn tag_cells_are_split_and_trimmed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tags.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["name", "path", "tags"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).expect("header");
        }
        sheet.write_string(1, 0, "entry").expect("cell");
        sheet.write_string(1, 1, "/entry").expect("cell");
        sheet.write_string(1, 2, " x ,y,  , x").expect("cell");
        workbook.save(&path).expect("save");

        let imported = read_workbook(&path).expect("read");
        assert_eq!(imported[0].tags, vec!["x", "y"]);
    }

    #[test]
    fn unparseable_document_fails_the_import() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("garbage.xlsx");
        std::fs::write(&path, b"this is not a workbook").expect("write garbage");
        assert!(read_workbook(&path).is_err());
    }
}
