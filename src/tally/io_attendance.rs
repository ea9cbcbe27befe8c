use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::tally::io_common::simplify_file_name;
use crate::tally::*;

/// One data row of an attendance workbook.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AttendanceRow {
    pub employee: u32,
    /// Display name as written in the workbook. May be empty.
    pub name: String,
    pub counters: AttendanceCounters,
}

// employee id | employee name | work days | present on time | leave on time |
// late minutes | early leave minutes | excess permissions
const ATTENDANCE_COLUMNS: usize = 8;

pub fn read_attendance_file(
    path: String,
    afs: &AttendanceFileSource,
) -> TallyResult<Vec<AttendanceRow>> {
    let wrange = get_range(&path, afs)?;

    let header = wrange
        .rows()
        .next()
        .context(EmptyWorkbookSnafu { path: path.clone() })?;
    debug!("read_attendance_file: header: {:?}", header);

    let mut iter = wrange.rows();
    iter.next();
    let mut res: Vec<AttendanceRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // The header occupies line 1 of the worksheet, data starts at line 2.
        let lineno = (idx + 2) as u64;
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        if row.len() < ATTENDANCE_COLUMNS {
            return WorkbookCellSnafu {
                path: path.clone(),
                lineno,
                content: format!("{:?}", row),
            }
            .fail();
        }
        let employee = read_count_cell(&row[0], path.as_str(), lineno)?;
        let name = match &row[1] {
            DataType::String(s) => s.trim().to_string(),
            DataType::Empty => String::new(),
            other => {
                return WorkbookCellSnafu {
                    path: path.clone(),
                    lineno,
                    content: format!("{:?}", other),
                }
                .fail();
            }
        };
        let counters = AttendanceCounters {
            total_work_days: read_count_cell(&row[2], path.as_str(), lineno)?,
            present_on_time: read_count_cell(&row[3], path.as_str(), lineno)?,
            leave_on_time: read_count_cell(&row[4], path.as_str(), lineno)?,
            late_minutes: read_count_cell(&row[5], path.as_str(), lineno)?,
            early_leave_minutes: read_count_cell(&row[6], path.as_str(), lineno)?,
            excess_permission_count: read_count_cell(&row[7], path.as_str(), lineno)?,
        };
        res.push(AttendanceRow {
            employee,
            name,
            counters,
        });
    }
    debug!(
        "read_attendance_file: {}: {} rows",
        simplify_file_name(path.as_str()),
        res.len()
    );
    Ok(res)
}

/// Attendance counters are whole non-negative numbers. Excel stores them as
/// floats, hand-edited sheets may carry integers, and an empty cell counts
/// as zero.
fn read_count_cell(cell: &DataType, path: &str, lineno: u64) -> TallyResult<u32> {
    match cell {
        DataType::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Ok(*f as u32),
        DataType::Int(i) if *i >= 0 => Ok(*i as u32),
        DataType::Empty => Ok(0),
        other => WorkbookCellSnafu {
            path,
            lineno,
            content: format!("{:?}", other),
        }
        .fail(),
    }
}

fn get_range(path: &String, afs: &AttendanceFileSource) -> TallyResult<calamine::Range<DataType>> {
    let worksheet_name_o = afs.worksheet_name.clone();
    debug!(
        "read_attendance_file: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let p = path.clone();
    let mut workbook: Xlsx<_> =
        open_workbook(p).context(OpeningWorkbookSnafu { path: path.clone() })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyWorkbookSnafu { path: path.clone() })?
            .context(OpeningWorkbookSnafu { path: path.clone() })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyWorkbookSnafu { path: path.clone() })?
            .context(OpeningWorkbookSnafu { path: path.clone() })?;
        Ok(wrange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_cells_accept_whole_numbers() {
        assert_eq!(read_count_cell(&DataType::Float(21.0), "t.xlsx", 2).unwrap(), 21);
        assert_eq!(read_count_cell(&DataType::Int(3), "t.xlsx", 2).unwrap(), 3);
        assert_eq!(read_count_cell(&DataType::Empty, "t.xlsx", 2).unwrap(), 0);
    }

    #[test]
    fn count_cells_reject_other_content() {
        let err = read_count_cell(&DataType::Float(2.5), "t.xlsx", 4).unwrap_err();
        assert!(matches!(err, TallyError::WorkbookCell { lineno: 4, .. }));
        let err = read_count_cell(&DataType::Float(-1.0), "t.xlsx", 4).unwrap_err();
        assert!(matches!(err, TallyError::WorkbookCell { .. }));
        let err = read_count_cell(&DataType::Int(-3), "t.xlsx", 5).unwrap_err();
        assert!(matches!(err, TallyError::WorkbookCell { .. }));
        let err =
            read_count_cell(&DataType::String("sick".to_string()), "t.xlsx", 6).unwrap_err();
        assert!(matches!(err, TallyError::WorkbookCell { lineno: 6, .. }));
    }
}
