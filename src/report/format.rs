use std::fmt::Write as _;

use crate::error::SinkError;

pub(super) fn write_line(output: &mut String, line: &str) -> Result<(), SinkError> {
    writeln!(output, "{}", line).map_err(|err| SinkError::WriteLine { source: err })
}

pub(super) fn table_row<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row = String::from("|");
    for cell in cells {
        row.push(' ');
        row.push_str(cell.as_ref());
        row.push_str(" |");
    }
    row
}

pub(super) fn separator_row(columns: usize) -> String {
    let mut row = String::from("|");
    for _ in 0..columns {
        row.push_str("---|");
    }
    row
}
