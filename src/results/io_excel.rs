// Results stored in Excel spreadsheets, with the same layout as the CSV files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::results::{
    io_common::{make_row, simplify_file_name, ParsedRow},
    *,
};

pub fn read_excel_results(path: &str, cfs: &FileSource) -> ResResult<Vec<ParsedRow>> {
    let default_election = simplify_file_name(path);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = get_range(&mut workbook, path, cfs)?;
    let first_row = cfs.first_data_row_index()?;

    // The range starts at the first non-empty cell, not at the first row of the sheet.
    let row_offset = wrange.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut res: Vec<ParsedRow> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = idx + row_offset + 1;
        if lineno < first_row {
            continue;
        }
        debug!("read_excel_results: lineno: {:?} row: {:?}", lineno, row);
        let cells: Vec<String> = row.iter().map(read_cell).collect();
        if cells.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        res.push(make_row(lineno, &cells, &default_election)?);
    }
    info!("read_excel_results: {} rows in {}", res.len(), path);
    Ok(res)
}

fn get_range<RS: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<RS>,
    path: &str,
    cfs: &FileSource,
) -> ResResult<Range<DataType>> {
    match cfs.worksheet_name.as_ref() {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path }),
        None => workbook
            .worksheet_range_at(0)
            .context(MissingWorksheetSnafu {
                name: "<first worksheet>",
                path,
            })?
            .context(OpeningExcelSnafu { path }),
    }
}

// Integers may be stored as floats by the spreadsheet.
fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Empty => "".to_string(),
        x => {
            warn!("read_cell: could not understand cell {:?}", x);
            "".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::Float(892.0)), "892");
        assert_eq!(read_cell(&DataType::Float(1.5)), "1.5");
        assert_eq!(read_cell(&DataType::Int(-3)), "-3");
        assert_eq!(read_cell(&DataType::String("Ana".to_string())), "Ana");
        assert_eq!(read_cell(&DataType::Empty), "");
    }

    fn county_source(worksheet: Option<&str>) -> (String, FileSource) {
        let path = format!(
            "{}/tests/county_xlsx/county_xlsx_results.xlsx",
            env!("CARGO_MANIFEST_DIR")
        );
        let mut cfs = FileSource::new("xlsx", &path);
        cfs.worksheet_name = worksheet.map(|s| s.to_string());
        cfs._first_data_row_index = Some(json!(5));
        (path, cfs)
    }

    #[test]
    fn read_named_worksheet() {
        let (path, cfs) = county_source(Some("Results"));
        let rows = read_excel_results(&path, &cfs).unwrap();
        assert_eq!(rows.len(), 4);
        // Sheet rows, even though the first two rows of the sheet are blank.
        assert_eq!(rows[0].lineno, 5);
        assert_eq!(rows[0].election, "county-2024");
        assert_eq!(rows[0].candidate_name, "Rita Hale");
        assert_eq!(rows[0].votes, 5210);
        assert_eq!(rows[3].lineno, 8);
        assert_eq!(rows[3].candidate_name, "ruiz");
        assert_eq!(rows[3].votes, 3700);
    }

    #[test]
    fn first_data_row() {
        let (path, mut cfs) = county_source(Some("Results"));
        cfs._first_data_row_index = Some(json!(7));
        let rows = read_excel_results(&path, &cfs).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, "assessor");
    }

    #[test]
    fn first_worksheet_by_default() {
        // The first sheet only holds a note in its first row.
        let (path, cfs) = county_source(None);
        assert!(read_excel_results(&path, &cfs).unwrap().is_empty());
    }

    #[test]
    fn unknown_worksheet() {
        let (path, cfs) = county_source(Some("Precincts"));
        assert!(matches!(
            read_excel_results(&path, &cfs),
            Err(ResultsError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn missing_file() {
        let path = format!("{}/tests/does_not_exist.xlsx", env!("CARGO_MANIFEST_DIR"));
        let cfs = FileSource::new("xlsx", &path);
        assert!(matches!(
            read_excel_results(&path, &cfs),
            Err(ResultsError::OpeningExcel { .. })
        ));
    }
}
