//! Reshaping of chart payloads into a renderable 2-D structure.
//!
//! The model is free with shapes: `data` may be a flat value array paired
//! with label columns, row-major nested arrays, or a flat array that only
//! makes sense regrouped into rows. Everything renderable is reshaped;
//! everything else becomes a typed error the caller shows to the user.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::SeriesPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
        }
    }
}

/// One named series of y-values, aligned with the chart's labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<f64>,
}

/// A chart ready to hand to any plotting front end: an x-axis label per row
/// and one or more aligned series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("payload has no columns")]
    EmptyColumns,
    #[error("payload has no data")]
    EmptyData,
    #[error("payload data is not an array")]
    NotAnArray,
    #[error("{columns} columns cannot be paired with {values} values")]
    ShapeMismatch { columns: usize, values: usize },
    #[error("value {value:?} in column '{column}' is not numeric")]
    NonNumeric { column: String, value: String },
}

/// Reshape a `columns` + `data` payload into a [`ChartView`].
///
/// Accepted shapes, in the order they are recognized:
/// - flat array with one value per column: columns become the x labels,
/// - row-major nested arrays: first column is the label axis, the remaining
///   columns become series (a single column charts against the row index),
/// - flat array whose length is a multiple of the column count: regrouped
///   into rows, then handled as above.
pub fn reshape(kind: ChartKind, payload: &SeriesPayload) -> Result<ChartView, ChartError> {
    if payload.columns.is_empty() {
        return Err(ChartError::EmptyColumns);
    }
    let Some(items) = payload.data.as_array() else {
        return Err(ChartError::NotAnArray);
    };
    if items.is_empty() {
        return Err(ChartError::EmptyData);
    }

    let width = payload.columns.len();

    if items.iter().all(|v| v.is_array()) {
        let rows: Vec<&Vec<Value>> = items
            .iter()
            .map(|v| v.as_array().expect("checked above"))
            .collect();
        return from_rows(kind, &payload.columns, &rows);
    }

    // Flat value array
    if items.len() == width && width > 1 {
        // One value per column: the columns are the x labels
        let points = items
            .iter()
            .map(|v| to_number("value", v))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(ChartView {
            kind,
            labels: payload.columns.clone(),
            series: vec![Series {
                name: "value".to_string(),
                points,
            }],
        });
    }

    if width == 1 {
        // Single column of values charted against the row index
        let points = items
            .iter()
            .map(|v| to_number(&payload.columns[0], v))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(ChartView {
            kind,
            labels: (0..points.len()).map(|i| i.to_string()).collect(),
            series: vec![Series {
                name: payload.columns[0].clone(),
                points,
            }],
        });
    }

    if items.len() % width == 0 {
        // Mismatched flat array that divides evenly: regroup into rows
        let grouped: Vec<Vec<Value>> = items.chunks(width).map(|c| c.to_vec()).collect();
        let rows: Vec<&Vec<Value>> = grouped.iter().collect();
        return from_rows(kind, &payload.columns, &rows);
    }

    Err(ChartError::ShapeMismatch {
        columns: width,
        values: items.len(),
    })
}

fn from_rows(
    kind: ChartKind,
    columns: &[String],
    rows: &[&Vec<Value>],
) -> Result<ChartView, ChartError> {
    let width = columns.len();
    for row in rows {
        if row.len() != width {
            return Err(ChartError::ShapeMismatch {
                columns: width,
                values: row.len(),
            });
        }
    }

    if width == 1 {
        let points = rows
            .iter()
            .map(|row| to_number(&columns[0], &row[0]))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(ChartView {
            kind,
            labels: (0..points.len()).map(|i| i.to_string()).collect(),
            series: vec![Series {
                name: columns[0].clone(),
                points,
            }],
        });
    }

    // First column labels the x axis, the rest are series
    let labels = rows.iter().map(|row| cell_to_string(&row[0])).collect();
    let mut series = Vec::with_capacity(width - 1);
    for (idx, name) in columns.iter().enumerate().skip(1) {
        let points = rows
            .iter()
            .map(|row| to_number(name, &row[idx]))
            .collect::<Result<Vec<_>, _>>()?;
        series.push(Series {
            name: name.clone(),
            points,
        });
    }

    Ok(ChartView {
        kind,
        labels,
        series,
    })
}

fn to_number(column: &str, value: &Value) -> Result<f64, ChartError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ChartError::NonNumeric {
            column: column.to_string(),
            value: n.to_string(),
        }),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| ChartError::NonNumeric {
            column: column.to_string(),
            value: s.clone(),
        }),
        other => Err(ChartError::NonNumeric {
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

pub(crate) fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
