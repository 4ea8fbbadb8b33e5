//! General-purpose text table alignment.
//!
//! Pads every cell of a rectangular table to its column's maximum width.
//! Widths are byte lengths; multi-byte or wide characters are not
//! width-adjusted.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Pads every cell to the maximum width of its column. Left alignment
/// right-pads with spaces, right alignment left-pads. Output dimensions
/// always equal input dimensions.
pub fn align_columns(rows: &[Vec<String>], alignments: &[Align]) -> Result<Vec<Vec<String>>> {
    let widths = column_widths(rows)?;
    if alignments.len() != widths.len() {
        return Err(Error::AlignmentCountMismatch {
            alignments: alignments.len(),
            columns: widths.len(),
        });
    }

    let aligned = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(widths.iter().zip(alignments.iter()))
                .map(|(cell, (&width, &align))| pad(cell, width, align))
                .collect()
        })
        .collect();
    Ok(aligned)
}

/// Maximum byte length per column. Errors on an empty table and on any row
/// whose column count differs from the first row's.
fn column_widths(rows: &[Vec<String>]) -> Result<Vec<usize>> {
    let first = rows.first().ok_or(Error::NoRows)?;
    let mut widths = vec![0usize; first.len()];
    for (i, row) in rows.iter().enumerate() {
        if row.len() != widths.len() {
            return Err(Error::RowWidthMismatch {
                row: i,
                expected: widths.len(),
                actual: row.len(),
            });
        }
        for (j, cell) in row.iter().enumerate() {
            widths[j] = widths[j].max(cell.len());
        }
    }
    Ok(widths)
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(cell.len());
    let mut out = String::with_capacity(width);
    match align {
        Align::Left => {
            out.push_str(cell);
            out.extend(std::iter::repeat(' ').take(fill));
        }
        Align::Right => {
            out.extend(std::iter::repeat(' ').take(fill));
            out.push_str(cell);
        }
    }
    out
}
