//! The MAP_ENV text script.
//!
//! ```text
//! PTREE "MAP_ENV","root";
//!     PTREE "fog";
//!         PTVAL 10;
//!         PTVAL 2.5, "speed";
//!         PTVALS 1,2,3;
//!     _PTREE;
//! _PTREE;
//! ```

use std::fmt::Write;

use log::warn;

use crate::error::{Error, Location, Result};
use crate::layout::ROOT_KEY_PREFIX;
use crate::value::Value;

/// One statement of a script.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Open a scope. `key` has the root prefix already stripped.
    TreeOpen { key: String, is_root_marker: bool },
    /// Close the innermost scope.
    TreeClose,
    /// Scalar leaf with an optional label string.
    Scalar { value: Value, label: Option<String> },
    /// List leaf.
    ValueList { values: Vec<Value> },
}

/// A statement together with the scope depth it appears at.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub depth: usize,
    pub statement: Statement,
}

/// Parse a whole script.
pub fn parse(text: &str) -> Result<Vec<Statement>> {
    parse_lines(text.lines())
}

/// Parse script lines, checking that scopes are balanced.
pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut open_keys: Vec<String> = Vec::new();

    for (i, line) in lines.into_iter().enumerate() {
        let line_no = i + 1;
        let Some(statement) = parse_line(line, line_no) else {
            continue;
        };
        match &statement {
            Statement::TreeOpen { key, .. } => open_keys.push(key.clone()),
            Statement::TreeClose => {
                if open_keys.pop().is_none() {
                    return Err(Error::MalformedTreeNesting {
                        location: Location::Line(line_no),
                        message: "_PTREE without a matching PTREE".into(),
                    });
                }
            }
            _ => {}
        }
        statements.push(statement);
    }

    if let Some(key) = open_keys.last() {
        return Err(Error::MalformedTreeNesting {
            location: Location::EndOfInput,
            message: format!("PTREE {key:?} is never closed"),
        });
    }

    Ok(statements)
}

/// Classify one line. Lines that are not statements yield `None`.
fn parse_line(line: &str, line_no: usize) -> Option<Statement> {
    let line = line.trim();

    if line.starts_with("PTREE") {
        let key: String = skip_chars(line, 6)
            .chars()
            .filter(|&c| c != '"' && c != ';')
            .map(|c| if c == ',' { ' ' } else { c })
            .collect();
        return Some(match key.strip_prefix(ROOT_KEY_PREFIX) {
            Some(root_key) => Statement::TreeOpen {
                key: root_key.to_owned(),
                is_root_marker: true,
            },
            None => Statement::TreeOpen {
                key,
                is_root_marker: false,
            },
        });
    }

    if line == "_PTREE;" {
        return Some(Statement::TreeClose);
    }

    if line.starts_with("PTVAL") && !line.starts_with("PTVALS") {
        let body = drop_last_char(skip_chars(line, 6));
        let mut fields = body.split(',').enumerate().map(|(n, field)| {
            let field = if n == 0 { field } else { field.trim_start() };
            field.replace('"', "")
        });
        let value = Value::convert(&fields.next().unwrap_or_default());
        let label = fields.next();
        let extra = fields.count();
        if extra > 0 {
            warn!("line {line_no}: ignoring {extra} field(s) after the PTVAL label");
        }
        return Some(Statement::Scalar { value, label });
    }

    if line.starts_with("PTVALS") {
        let body = drop_last_char(skip_chars(line, 7));
        let values = body.split(',').map(Value::convert).collect();
        return Some(Statement::ValueList { values });
    }

    None
}

fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[i..],
        None => "",
    }
}

fn drop_last_char(s: &str) -> &str {
    match s.char_indices().next_back() {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Format lines back into script text.
pub fn render(lines: &[Line], indent_width: usize) -> String {
    let mut out = String::new();
    for line in lines {
        let indent = line.depth * indent_width;
        let _ = write!(out, "{:indent$}", "");
        match &line.statement {
            Statement::TreeOpen {
                key,
                is_root_marker: true,
            } => {
                let _ = writeln!(out, "PTREE \"MAP_ENV\",\"{key}\";");
            }
            Statement::TreeOpen { key, .. } => {
                let _ = writeln!(out, "PTREE \"{key}\";");
            }
            Statement::TreeClose => out.push_str("_PTREE;\n"),
            Statement::Scalar { value, label: None } => {
                let _ = writeln!(out, "PTVAL {value};");
            }
            Statement::Scalar {
                value,
                label: Some(label),
            } => {
                let _ = writeln!(out, "PTVAL {value}, \"{label}\";");
            }
            Statement::ValueList { values } => {
                let joined: Vec<String> = values.iter().map(Value::to_string).collect();
                let _ = writeln!(out, "PTVALS {};", joined.join(","));
            }
        }
    }
    out
}
