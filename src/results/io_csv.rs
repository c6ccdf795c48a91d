// Primitives for reading CSV files.

use std::fs::File;

use crate::results::{
    io_common::{make_row, simplify_file_name, ParsedRow},
    *,
};

pub fn read_csv_results(path: &str, cfs: &FileSource) -> ResResult<Vec<ParsedRow>> {
    let default_election = simplify_file_name(path);
    let (records, row_offset) = get_records(path, cfs)?;

    let mut res: Vec<ParsedRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_results: lineno: {:?} row: {:?}", lineno, line);
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if cells.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        res.push(make_row(lineno, &cells, &default_election)?);
    }
    info!("read_csv_results: {} rows in {}", res.len(), path);
    Ok(res)
}

fn get_records(path: &str, cfs: &FileSource) -> ResResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_data_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // The index starts at 1 to respect most conventions in the excel world
    for _ in 1..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}
