use crate::constants::FLATTEN_SEPARATOR;
use crate::errors::{AppError, AppResult};
use crate::models::Fields;
use polars::prelude::*;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One flattened leaf: the key path that led to it and its value.
type Leaf = (Vec<String>, Value);

/// Flattens one record into `(column, value)` pairs.
///
/// Nested objects expand into dot-joined keys (`a.b.c`), recursively. Arrays and
/// scalars are leaves; an empty object becomes a null leaf.
///
/// # Errors
///
/// Returns `TabularError` when two paths produce the same column name, e.g. a
/// literal `"a.b"` key next to `{"a": {"b": ...}}`.
pub fn flatten_record(fields: &Fields) -> AppResult<Vec<(String, Value)>> {
    Ok(flatten_leaves(fields)?
        .into_iter()
        .map(|(path, value)| (join_path(&path), value))
        .collect())
}

fn join_path(path: &[String]) -> String {
    path.join(FLATTEN_SEPARATOR)
}

fn flatten_leaves(fields: &Fields) -> AppResult<Vec<Leaf>> {
    let mut out = Vec::with_capacity(fields.len());
    let mut seen = HashSet::with_capacity(fields.len());
    let mut path = Vec::new();
    flatten_into(&mut path, fields, &mut out, &mut seen)?;
    Ok(out)
}

fn flatten_into(
    path: &mut Vec<String>,
    fields: &Fields,
    out: &mut Vec<Leaf>,
    seen: &mut HashSet<String>,
) -> AppResult<()> {
    for (key, value) in fields {
        path.push(key.clone());
        match value {
            Value::Object(inner) if !inner.is_empty() => {
                flatten_into(path, inner, out, seen)?;
            }
            _ => {
                let column = join_path(path);
                if !seen.insert(column.clone()) {
                    return Err(AppError::TabularError(format!(
                        "Column '{column}' produced twice while flattening"
                    )));
                }
                let leaf = match value {
                    Value::Object(_) => Value::Null,
                    other => other.clone(),
                };
                out.push((path.clone(), leaf));
            }
        }
        path.pop();
    }
    Ok(())
}

/// Builds one typed column from its cells.
///
/// All-integer cells become `Int64`, all-numeric `Float64`, all-boolean `Boolean`;
/// anything else is a `String` column with arrays and numbers rendered as JSON text.
/// Null cells are nulls in every case.
fn build_series(name: &str, cells: Vec<Value>) -> Series {
    let present = || cells.iter().filter(|v| !v.is_null());

    let has_values = present().next().is_some();
    if has_values && present().all(|v| v.is_i64()) {
        let values: Vec<Option<i64>> = cells.iter().map(Value::as_i64).collect();
        return Series::new(name, values);
    }
    if has_values && present().all(Value::is_number) {
        let values: Vec<Option<f64>> = cells.iter().map(Value::as_f64).collect();
        return Series::new(name, values);
    }
    if has_values && present().all(Value::is_boolean) {
        let values: Vec<Option<bool>> = cells.iter().map(Value::as_bool).collect();
        return Series::new(name, values);
    }

    let values: Vec<Option<String>> = cells
        .into_iter()
        .map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect();
    Series::new(name, values)
}

/// Projects records into a fixed-column table.
///
/// The column set is the union of flattened keys in first-seen order; every
/// record contributes exactly one row and absent columns are null. When no
/// record has any field the frame has no columns, and so a height of zero;
/// callers that need the row count keep the record count alongside.
///
/// # Errors
///
/// Returns `TabularError` if a record cannot be flattened, if two records reach
/// the same column name through different key paths, or if the frame cannot be built.
pub fn records_to_dataframe<'a, I>(records: I) -> AppResult<DataFrame>
where
    I: IntoIterator<Item = &'a Fields>,
{
    let mut rows = Vec::new();
    for fields in records {
        rows.push(flatten_leaves(fields)?);
    }

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, (usize, &[String])> = HashMap::new();
    for row in &rows {
        for (path, _) in row {
            let column = join_path(path);
            match index.get(&column) {
                Some((_, first)) if *first != path.as_slice() => {
                    return Err(AppError::TabularError(format!(
                        "Column '{column}' produced by different key paths across records"
                    )));
                }
                Some(_) => {}
                None => {
                    index.insert(column.clone(), (columns.len(), path.as_slice()));
                    columns.push(column);
                }
            }
        }
    }

    let height = rows.len();
    let positions: Vec<Vec<usize>> = rows
        .iter()
        .map(|row| row.iter().map(|(path, _)| index[&join_path(path)].0).collect())
        .collect();
    let mut cells: Vec<Vec<Value>> = vec![vec![Value::Null; height]; columns.len()];
    for (row_idx, (row, cols)) in rows.into_iter().zip(positions).enumerate() {
        for ((_, value), col) in row.into_iter().zip(cols) {
            cells[col][row_idx] = value;
        }
    }

    let series: Vec<Series> = columns
        .iter()
        .zip(cells)
        .map(|(name, column_cells)| build_series(name, column_cells))
        .collect();

    DataFrame::new(series)
        .map_err(|e| AppError::TabularError(format!("Failed to create DataFrame: {e}")))
}
