//! Column descriptors parsed from the `--format` option.
//!
//! Each column entry has the form `FIELD[,ALIGN[,FUNCTION[=ARG]]]`. Fields
//! come from a closed set, alignments are exactly "L" or "R", and the
//! formatting function is resolved against a per-field registry when the
//! column is built, never at render time.

use std::fmt;

use crate::align::Align;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Pid,
    ParentPid,
    CpuPercent,
    VirtualSize,
    ResidentSize,
    StartTime,
    Uptime,
    Command,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Pid => "pid",
            Field::ParentPid => "parent_pid",
            Field::CpuPercent => "cpu_percent",
            Field::VirtualSize => "virtual_size",
            Field::ResidentSize => "resident_size",
            Field::StartTime => "start_time",
            Field::Uptime => "uptime",
            Field::Command => "command",
        }
    }

    /// Fixed display title used for the header row.
    pub fn title(self) -> &'static str {
        match self {
            Field::Pid => "PID",
            Field::ParentPid => "PPID",
            Field::CpuPercent => "%CPU",
            Field::VirtualSize => "VSZ",
            Field::ResidentSize => "RSS",
            Field::StartTime => "START",
            Field::Uptime => "UPTIME",
            Field::Command => "COMMAND",
        }
    }

    fn parse(s: &str) -> Result<Field> {
        match s {
            "pid" => Ok(Field::Pid),
            "parent_pid" => Ok(Field::ParentPid),
            "cpu_percent" => Ok(Field::CpuPercent),
            "virtual_size" => Ok(Field::VirtualSize),
            "resident_size" => Ok(Field::ResidentSize),
            "start_time" => Ok(Field::StartTime),
            "uptime" => Ok(Field::Uptime),
            "command" => Ok(Field::Command),
            other => Err(Error::InvalidField {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Formatting rule attached to a column. The registry is closed: each
/// function name is valid only for the fields listed here.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatRule {
    /// Default string conversion of the typed value.
    Default,
    /// `iBytes` on virtual_size / resident_size.
    IecBytes,
    /// `format=LAYOUT` on start_time; chrono strftime layout.
    TimeLayout(String),
    /// `humanRelTime` on start_time.
    RelativeTime,
    /// `seconds` on uptime.
    Seconds,
    /// `duration` on uptime.
    Duration,
}

impl FormatRule {
    fn parse(field: Field, spec: &str) -> Result<FormatRule> {
        let (name, arg) = match spec.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg)),
            None => (spec.trim(), None),
        };
        match (field, name) {
            (Field::VirtualSize | Field::ResidentSize, "iBytes") => Ok(FormatRule::IecBytes),
            (Field::StartTime, "format") => match arg {
                Some(layout) => {
                    // Bad strftime specifiers would otherwise only surface
                    // while formatting a cell.
                    if !layout_is_valid(layout) {
                        return Err(Error::InvalidTimeLayout {
                            layout: layout.to_string(),
                        });
                    }
                    Ok(FormatRule::TimeLayout(layout.to_string()))
                }
                None => Err(Error::FunctionNeedsArg { function: "format" }),
            },
            (Field::StartTime, "humanRelTime") => Ok(FormatRule::RelativeTime),
            (Field::Uptime, "seconds") => Ok(FormatRule::Seconds),
            (Field::Uptime, "duration") => Ok(FormatRule::Duration),
            (_, other) => Err(Error::UnknownFunction {
                field: field.name(),
                function: other.to_string(),
            }),
        }
    }
}

fn layout_is_valid(layout: &str) -> bool {
    use chrono::format::{Item, StrftimeItems};
    StrftimeItems::new(layout).all(|item| !matches!(item, Item::Error))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub field: Field,
    pub align: Align,
    pub format: FormatRule,
}

/// Parses the whole `--format` value into column descriptors. `sep`
/// separates column entries; columns that omit an alignment use
/// `default_align`.
pub fn parse_columns(spec: &str, sep: &str, default_align: Align) -> Result<Vec<Column>> {
    spec.split(sep)
        .map(|entry| parse_column(entry.trim(), default_align))
        .collect()
}

fn parse_column(entry: &str, default_align: Align) -> Result<Column> {
    if entry.is_empty() {
        return Err(Error::ColumnSyntax(entry.to_string()));
    }
    let mut terms = entry.splitn(3, ',');
    let field = Field::parse(terms.next().unwrap_or_default().trim())?;
    let align = match terms.next() {
        Some(a) => parse_align(a.trim())?,
        None => default_align,
    };
    let format = match terms.next() {
        Some(f) => FormatRule::parse(field, f.trim())?,
        None => FormatRule::Default,
    };
    Ok(Column {
        field,
        align,
        format,
    })
}

/// Alignment tokens are exactly "L" or "R", case-sensitive.
pub fn parse_align(s: &str) -> Result<Align> {
    match s {
        "L" => Ok(Align::Left),
        "R" => Ok(Align::Right),
        other => Err(Error::InvalidAlignment {
            value: other.to_string(),
        }),
    }
}

pub fn header(columns: &[Column]) -> Vec<String> {
    columns.iter().map(|c| c.field.title().to_string()).collect()
}

pub fn alignments(columns: &[Column]) -> Vec<Align> {
    columns.iter().map(|c| c.align).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_FORMAT, DEFAULT_FORMAT_SEP};

    #[test]
    fn test_parse_default_format() {
        let columns = parse_columns(DEFAULT_FORMAT, DEFAULT_FORMAT_SEP, Align::Right)
            .expect("default format must parse");
        let fields: Vec<Field> = columns.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::Pid,
                Field::ParentPid,
                Field::VirtualSize,
                Field::ResidentSize,
                Field::StartTime,
                Field::Uptime,
                Field::Command,
            ]
        );
        assert_eq!(columns[2].format, FormatRule::IecBytes);
        assert_eq!(
            columns[4].format,
            FormatRule::TimeLayout("%Y-%m-%d %H:%M".to_string())
        );
        assert_eq!(columns[4].align, Align::Left);
        assert_eq!(columns[5].format, FormatRule::Duration);
    }

    #[test]
    fn test_missing_align_uses_default() {
        let columns = parse_columns("pid;uptime", ";", Align::Right).unwrap();
        assert_eq!(columns[0].align, Align::Right);
        assert_eq!(columns[1].align, Align::Right);
        let columns = parse_columns("pid", ";", Align::Left).unwrap();
        assert_eq!(columns[0].align, Align::Left);
    }

    #[test]
    fn test_invalid_field_is_rejected() {
        let err = parse_columns("pid;vsz", ";", Align::Right).unwrap_err();
        match err {
            Error::InvalidField { value } => assert_eq!(value, "vsz"),
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }

    #[test]
    fn test_alignment_is_case_sensitive() {
        assert!(parse_align("L").is_ok());
        assert!(parse_align("R").is_ok());
        for bad in ["l", "r", "left", "right", ""] {
            let err = parse_align(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidAlignment { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_unknown_function_fails_at_build_time() {
        let err = parse_columns("uptime,R,iBytes", ";", Align::Right).unwrap_err();
        match err {
            Error::UnknownFunction { field, function } => {
                assert_eq!(field, "uptime");
                assert_eq!(function, "iBytes");
            }
            other => panic!("expected UnknownFunction, got {other:?}"),
        }
    }

    #[test]
    fn test_format_function_requires_layout_argument() {
        let err = parse_columns("start_time,L,format", ";", Align::Right).unwrap_err();
        assert!(matches!(err, Error::FunctionNeedsArg { function: "format" }));
    }

    #[test]
    fn test_bad_time_layout_fails_at_build_time() {
        let err = parse_columns("start_time,L,format=%Q", ";", Align::Right).unwrap_err();
        assert!(matches!(err, Error::InvalidTimeLayout { .. }));
    }

    #[test]
    fn test_empty_entry_is_a_syntax_error() {
        let err = parse_columns("pid;;uptime", ";", Align::Right).unwrap_err();
        assert!(matches!(err, Error::ColumnSyntax(_)));
    }

    #[test]
    fn test_header_and_alignments() {
        let columns = parse_columns("pid,R;command,L", ";", Align::Right).unwrap();
        assert_eq!(header(&columns), vec!["PID", "COMMAND"]);
        assert_eq!(alignments(&columns), vec![Align::Right, Align::Left]);
    }
}
