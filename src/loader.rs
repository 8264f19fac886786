use crate::error::LoadError;
use crate::types::{Cell, Column, InventoryRecord, Table};
use crate::util::{clean_text, parse_numeric};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, Local};
use csv::ReaderBuilder;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Placeholder for a category the source never provided, e.g. a state
/// missing on the very first row.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub rows: usize,
    pub missing_columns: Vec<Column>,
    pub coerced_cells: usize,
    pub filled_states: usize,
    pub filled_divisions: usize,
    pub loaded_at: DateTime<Local>,
}

/// Raw header plus cell rows, independent of the file format.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn header_text(cell: &Cell) -> String {
    clean_text(cell).unwrap_or_default()
}

/// Read one named sheet of a workbook. The first row is the header.
pub fn read_workbook(path: &Path, sheet: &str) -> Result<Grid, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let available = workbook.sheet_names();
    if !available.iter().any(|s| s == sheet) {
        return Err(LoadError::SheetMissing {
            sheet: sheet.to_string(),
            available,
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(LoadError::NoHeader)?
        .iter()
        .map(|d| header_text(&data_to_cell(d)))
        .collect();
    let rows = rows
        .map(|r| r.iter().map(data_to_cell).collect())
        .collect();
    Ok(Grid { headers, rows })
}

/// Read a CSV export of the sheet.
pub fn read_csv<R: io::Read>(rdr: R) -> Result<Grid, LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::NoHeader);
    }
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(Grid { headers, rows })
}

/// Propagate the last present value downward, in row order. Returns how
/// many cells were filled.
fn forward_fill(values: &mut [Option<String>]) -> usize {
    let mut last: Option<String> = None;
    let mut filled = 0usize;
    for v in values.iter_mut() {
        if v.is_some() {
            last = v.clone();
        } else if let Some(prev) = &last {
            *v = Some(prev.clone());
            filled += 1;
        }
    }
    filled
}

/// Turn a raw grid into the typed table.
///
/// Columns are resolved once by trimmed header name; the first occurrence
/// of a duplicate header wins. Absent columns read as missing cells.
pub fn build_table(grid: &Grid) -> (Table, LoadReport) {
    let mut positions: HashMap<Column, usize> = HashMap::new();
    for (idx, header) in grid.headers.iter().enumerate() {
        if let Some(col) = Column::from_header(header) {
            positions.entry(col).or_insert(idx);
        }
    }
    let present: BTreeSet<Column> = positions.keys().copied().collect();
    let missing_columns: Vec<Column> = Column::ALL
        .into_iter()
        .filter(|c| !present.contains(c))
        .collect();
    if !missing_columns.is_empty() {
        warn!(missing = ?missing_columns, "source is missing expected columns");
    }

    let empty = Cell::Empty;
    let cell = |row: &[Cell], col: Column| -> Cell {
        positions
            .get(&col)
            .and_then(|&i| row.get(i))
            .unwrap_or(&empty)
            .clone()
    };

    let mut states: Vec<Option<String>> = Vec::with_capacity(grid.rows.len());
    let mut divisions: Vec<Option<String>> = Vec::with_capacity(grid.rows.len());
    let mut coerced_cells = 0usize;
    let mut number = |c: Cell| -> f64 {
        parse_numeric(&c).unwrap_or_else(|| {
            coerced_cells += 1;
            0.0
        })
    };

    let mut records: Vec<InventoryRecord> = Vec::with_capacity(grid.rows.len());
    for row in &grid.rows {
        states.push(clean_text(&cell(row, Column::State)));
        divisions.push(clean_text(&cell(row, Column::Division)));
        let text = |col: Column| clean_text(&cell(row, col)).unwrap_or_default();
        records.push(InventoryRecord {
            state: String::new(),
            division: String::new(),
            location_name: text(Column::LocationName),
            location_type: text(Column::LocationType),
            courts_regular: number(cell(row, Column::CourtsRegular)),
            courts_family: number(cell(row, Column::CourtsFamily)),
            courts_tjo: number(cell(row, Column::CourtsTjo)),
            courts_total: number(cell(row, Column::CourtsTotal)),
            hardware_item: text(Column::HardwareItem),
            required_qty: number(cell(row, Column::RequiredQty)),
            distributed_qty: number(cell(row, Column::DistributedQty)),
            balance_qty: number(cell(row, Column::BalanceQty)),
            status: text(Column::Status),
        });
    }

    let filled_states = forward_fill(&mut states);
    let filled_divisions = forward_fill(&mut divisions);
    for ((r, state), division) in records.iter_mut().zip(states).zip(divisions) {
        r.state = state.unwrap_or_else(|| UNKNOWN.to_string());
        r.division = division.unwrap_or_else(|| UNKNOWN.to_string());
    }

    let report = LoadReport {
        rows: records.len(),
        missing_columns,
        coerced_cells,
        filled_states,
        filled_divisions,
        loaded_at: Local::now(),
    };
    (Table::new(records, present), report)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Read and clean the inventory source. CSV files ignore `sheet`.
pub fn load_table(path: &Path, sheet: &str) -> Result<(Table, LoadReport), LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let grid = if is_csv(path) {
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        read_csv(file)?
    } else {
        read_workbook(path, sheet)?
    };
    debug!(columns = grid.headers.len(), rows = grid.rows.len(), "read source grid");
    Ok(build_table(&grid))
}

/// Session cache for the loaded table.
///
/// The first successful load is kept for the lifetime of the cache; later
/// calls hand out the same table without touching the source. Failures are
/// not cached so the next request tries again.
pub struct TableCache {
    path: PathBuf,
    sheet: String,
    loaded: Option<(Arc<Table>, LoadReport)>,
}

impl TableCache {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            loaded: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn report(&self) -> Option<&LoadReport> {
        self.loaded.as_ref().map(|(_, report)| report)
    }

    pub fn get_or_load(&mut self) -> Result<Arc<Table>, LoadError> {
        if let Some((table, _)) = &self.loaded {
            return Ok(Arc::clone(table));
        }
        let (table, report) = load_table(&self.path, &self.sheet)?;
        info!(
            path = %self.path.display(),
            sheet = %self.sheet,
            rows = report.rows,
            "loaded inventory"
        );
        let table = Arc::new(table);
        self.loaded = Some((Arc::clone(&table), report));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
 State ,Session_Division,Location_Name,Location_Type,Hardware_Item,Status,Required_Qty,Distributed_Qty,Balance_Qty,Courts_Count,Family_Courts,TJOs,Total_Courts
NSW,North, Central ,Metro,Printer,Shortfall,10,6,-4,3,1,0,4
,,Central,Metro,Scanner,Balanced,5,5,0,3,1,0,4
nan,South,Riverside,Regional,Printer,Surplus,2,3,1,1,0,1,x
VIC,,Bayside,Metro,Printer,,4,n/a,-4,2,0,0,2
";

    fn sample_table() -> (Table, LoadReport) {
        let grid = read_csv(SAMPLE.as_bytes()).unwrap();
        build_table(&grid)
    }

    #[test]
    fn headers_are_trimmed_and_all_columns_resolve() {
        let (table, report) = sample_table();
        assert!(report.missing_columns.is_empty());
        assert!(table.has(Column::State));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn state_and_division_forward_fill_in_row_order() {
        let (table, report) = sample_table();
        let states: Vec<&str> = table.records().iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["NSW", "NSW", "NSW", "VIC"]);
        let divisions: Vec<&str> = table
            .records()
            .iter()
            .map(|r| r.division.as_str())
            .collect();
        assert_eq!(divisions, vec!["North", "North", "South", "South"]);
        assert_eq!(report.filled_states, 2);
        assert_eq!(report.filled_divisions, 2);
    }

    #[test]
    fn text_is_trimmed_and_missing_text_is_empty() {
        let (table, _) = sample_table();
        assert_eq!(table.records()[0].location_name, "Central");
        assert_eq!(table.records()[3].status, "");
    }

    #[test]
    fn bad_numbers_coerce_to_zero() {
        let (table, report) = sample_table();
        assert_eq!(table.records()[2].courts_total, 0.0);
        assert_eq!(table.records()[3].distributed_qty, 0.0);
        assert_eq!(table.records()[0].balance_qty, -4.0);
        assert_eq!(report.coerced_cells, 2);
    }

    #[test]
    fn leading_missing_state_becomes_unknown() {
        let csv = "State,Location_Name\n,A\nQLD,B\n";
        let (table, _) = build_table(&read_csv(csv.as_bytes()).unwrap());
        assert_eq!(table.records()[0].state, UNKNOWN);
        assert_eq!(table.records()[1].state, "QLD");
    }

    #[test]
    fn absent_columns_are_reported_not_fatal() {
        let csv = "State,Location_Name,Hardware_Item,Required_Qty\nNSW,A,Printer,3\n";
        let (table, report) = build_table(&read_csv(csv.as_bytes()).unwrap());
        assert!(!table.has(Column::Status));
        assert!(report.missing_columns.contains(&Column::CourtsTotal));
        assert_eq!(table.records()[0].required_qty, 3.0);
        assert_eq!(table.records()[0].balance_qty, 0.0);
        assert_eq!(table.records()[0].division, UNKNOWN);
    }

    #[test]
    fn loading_twice_gives_identical_tables() {
        let (first, _) = sample_table();
        let (second, _) = sample_table();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_source_is_a_load_error() {
        let err = load_table(Path::new("definitely/not/here.xlsx"), "Tooli").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn empty_csv_has_no_header() {
        let err = read_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::NoHeader));
    }

    #[test]
    fn cache_serves_the_first_load_after_the_source_is_gone() {
        let path = std::env::temp_dir().join(format!(
            "court_report_cache_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, SAMPLE).unwrap();

        let mut cache = TableCache::new(&path, "Tooli");
        assert!(!cache.is_loaded());
        let first = cache.get_or_load().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.report().map(|r| r.rows), Some(4));
    }

    fn write_workbook(name: &str) -> Result<PathBuf, rust_xlsxwriter::XlsxError> {
        use rust_xlsxwriter::Workbook;

        let path = std::env::temp_dir().join(format!("{}_{}.xlsx", name, std::process::id()));
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Tooli")?;

        let headers = [
            " State ",
            "Session_Division",
            "Location_Name",
            "Location_Type",
            "Hardware_Item",
            "Status",
            "Required_Qty",
            "Distributed_Qty",
            "Balance_Qty",
            "Courts_Count",
            "Family_Courts",
            "TJOs",
            "Total_Courts",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }

        // Row 1: fully populated.
        for (col, text) in ["NSW", "North", "Central", "Metro", "Printer", "Shortfall"]
            .iter()
            .enumerate()
        {
            sheet.write_string(1, col as u16, *text)?;
        }
        for (col, v) in [10.0, 6.0, -4.0, 3.0, 1.0, 0.0, 4.0].iter().enumerate() {
            sheet.write_number(1, 6 + col as u16, *v)?;
        }

        // Row 2: blank state and division, text in a quantity cell.
        for (col, text) in ["Central", "Metro", "Scanner", "Balanced"].iter().enumerate() {
            sheet.write_string(2, 2 + col as u16, *text)?;
        }
        sheet.write_string(2, 6, "oops")?;
        for (col, v) in [5.0, 0.0, 3.0, 1.0, 0.0, 4.0].iter().enumerate() {
            sheet.write_number(2, 7 + col as u16, *v)?;
        }

        // Row 3: numeric location name.
        sheet.write_string(3, 0, "VIC")?;
        sheet.write_string(3, 1, "South")?;
        sheet.write_number(3, 2, 101.0)?;
        for (col, text) in ["Regional", "Printer", "Surplus"].iter().enumerate() {
            sheet.write_string(3, 3 + col as u16, *text)?;
        }
        for (col, v) in [2.0, 3.0, 1.0, 1.0, 0.0, 1.0, 2.0].iter().enumerate() {
            sheet.write_number(3, 6 + col as u16, *v)?;
        }

        workbook.save(&path)?;
        Ok(path)
    }

    #[test]
    fn workbook_sheet_is_cleaned_like_csv() {
        let path = write_workbook("court_report_tooli").unwrap();
        let (table, report) = load_table(&path, "Tooli").unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(report.missing_columns.is_empty());
        let states: Vec<&str> = table.records().iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["NSW", "NSW", "VIC"]);
        assert_eq!(table.records()[1].division, "North");
        assert_eq!(report.filled_states, 1);
        assert_eq!(report.filled_divisions, 1);

        let required: Vec<f64> = table.records().iter().map(|r| r.required_qty).collect();
        assert_eq!(required, vec![10.0, 0.0, 2.0]);
        assert_eq!(report.coerced_cells, 1);
        assert_eq!(table.records()[0].balance_qty, -4.0);
        assert_eq!(table.records()[2].location_name, "101");
    }

    #[test]
    fn absent_workbook_sheet_is_a_load_error() {
        let path = write_workbook("court_report_no_sheet").unwrap();
        let err = load_table(&path, "Nope").unwrap_err();
        std::fs::remove_file(&path).unwrap();

        match err {
            LoadError::SheetMissing { sheet, available } => {
                assert_eq!(sheet, "Nope");
                assert_eq!(available, vec!["Tooli".to_string()]);
            }
            other => panic!("expected SheetMissing, got {:?}", other),
        }
    }
}
