use crate::error::AnalysisError;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

fn create_parent(path: &Path) -> Result<(), AnalysisError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AnalysisError> {
    create_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AnalysisError> {
    create_parent(path)?;
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows, or `None` for an empty table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LabelCount;

    fn counts() -> Vec<LabelCount> {
        vec![
            LabelCount { label: "Stable".into(), count: 3 },
            LabelCount { label: "Volatile".into(), count: 1 },
        ]
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("counts.csv");
        write_csv(&path, &counts()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Label,Count\nStable,3\nVolatile,1\n");
    }

    #[test]
    fn json_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("summary.json");
        write_json(&path, &counts()[0]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["Count"], 3);
    }

    #[test]
    fn markdown_preview_truncates() {
        let table = render_table(&counts(), 1).unwrap();
        assert!(table.contains("| Label"));
        assert!(table.contains("Stable"));
        assert!(!table.contains("Volatile"));
        assert!(render_table::<LabelCount>(&[], 5).is_none());
    }
}
