use crate::domain::{ComputedGrid, Grid};
use std::fs;

/// Native workbook persistence: the raw grid as pretty-printed JSON.
pub struct FileRepository;

impl FileRepository {
    pub fn save_grid(grid: &Grid, filename: &str) -> Result<String, String> {
        match serde_json::to_string_pretty(grid) {
            Ok(json) => match fs::write(filename, &json) {
                Ok(_) => Ok(filename.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }

    pub fn load_grid(filename: &str) -> Result<(Grid, String), String> {
        match fs::read_to_string(filename) {
            Ok(content) => match serde_json::from_str::<Grid>(&content) {
                Ok(grid) => Ok((grid, filename.to_string())),
                Err(e) => Err(format!("Invalid file format - {}", e)),
            },
            Err(e) => Err(e.to_string()),
        }
    }
}

/// CSV exchange: raw grids come in, computed grids go out.
///
/// The header row carries the column labels, so a file whose headers are
/// plain letters round-trips as a referenceable grid. Exports hold display
/// values only; formulas do not survive the trip.
pub struct CsvStore;

impl CsvStore {
    pub fn import_grid(filename: &str) -> Result<Grid, String> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(filename)
            .map_err(|e| e.to_string())?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            let mut row: Vec<String> = record.iter().map(|field| field.to_string()).collect();
            // Ragged records are padded or truncated to the header width
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Grid { columns, rows })
    }

    pub fn export_computed(computed: &ComputedGrid, filename: &str) -> Result<String, String> {
        let mut writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;

        writer
            .write_record(&computed.columns)
            .map_err(|e| e.to_string())?;
        for row in &computed.rows {
            let record: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            writer.write_record(&record).map_err(|e| e.to_string())?;
        }

        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FormulaEvaluator;

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.gridcalc");
        let path = path.to_str().unwrap();

        let mut grid = Grid::with_size(2, 2);
        grid.set(0, 0, "10".to_string());
        grid.set(1, 1, "=A1*2".to_string());

        let saved = FileRepository::save_grid(&grid, path).unwrap();
        assert_eq!(saved, path);

        let (loaded, filename) = FileRepository::load_grid(path).unwrap();
        assert_eq!(loaded, grid);
        assert_eq!(filename, path);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(FileRepository::load_grid("/nonexistent/sheet.gridcalc").is_err());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gridcalc");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileRepository::load_grid(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_csv_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "A,B,C\n1,2,=A1+B1\n4,,x\n").unwrap();

        let grid = CsvStore::import_grid(path.to_str().unwrap()).unwrap();
        assert_eq!(grid.columns, vec!["A", "B", "C"]);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.get(0, 2), "=A1+B1");
        assert_eq!(grid.get(1, 1), "");
    }

    #[test]
    fn test_csv_import_pads_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "A,B,C\n1\n1,2,3,4\n").unwrap();

        let grid = CsvStore::import_grid(path.to_str().unwrap()).unwrap();
        assert_eq!(grid.rows[0], vec!["1", "", ""]);
        assert_eq!(grid.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_export_holds_display_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let path = path.to_str().unwrap();

        let mut grid = Grid::with_size(1, 3);
        grid.set(0, 0, "2".to_string());
        grid.set(0, 1, "=A1*3".to_string());
        grid.set(0, 2, "=SUM(".to_string());
        let computed = FormulaEvaluator::new().evaluate_grid(&grid);

        CsvStore::export_computed(&computed, path).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "A,B,C\n2,6,ERR\n");
    }

    #[test]
    fn test_csv_missing_file_fails() {
        assert!(CsvStore::import_grid("/nonexistent/data.csv").is_err());
    }
}
