//! Conversion between tabular record sets and rank-2 tensors
//!
//! A [`DataFrame`] with N rows and M columns maps to a tensor of shape `[N, M]`
//! where element `[i, j]` is row `i`'s value under the `j`-th column name.
//!
//! # Example
//! ```
//! use tensor_interop_tabular::{dataframe_to_tensor, tensor_to_dataframe_sync, DataFrame};
//!
//! let df = DataFrame::from_json(r#"[{"a":1,"b":2},{"a":3,"b":4}]"#)?;
//! let tensor = dataframe_to_tensor(&df)?;
//! assert_eq!(tensor.shape(), &[2, 2]);
//!
//! let back = tensor_to_dataframe_sync(&tensor, Some(df.columns()))?;
//! assert_eq!(back.to_json()?, r#"[{"a":1,"b":2},{"a":3,"b":4}]"#);
//! # Ok::<(), tensor_interop_common::ConversionError>(())
//! ```

mod frame;

pub use frame::{DataFrame, Row};

use ndarray::{Array, IxDyn};
use serde_json::{Number, Value};
use tensor_interop_common::{ConversionError, Result, Tensor};
use tracing::debug;

/// Error message for tensors that are not rank 2
pub const NOT_2D_MESSAGE: &str = "Only 2D tensors can be converted to a DataFrame";

/// Largest integer an f64 represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert a record set to a `[rows, columns]` tensor
///
/// Values are read row-major in the frame's column order. Non-numeric values
/// are coerced the way a typed numeric array would coerce them (see
/// [`coerce_value`]).
///
/// # Errors
/// Returns [`ConversionError::MissingField`] when a row has no value for one
/// of the frame's columns.
pub fn dataframe_to_tensor(df: &DataFrame) -> Result<Tensor> {
    let (rows, cols) = df.shape();
    let mut values = Vec::with_capacity(rows * cols);

    for (index, row) in df.rows().iter().enumerate() {
        for column in df.columns() {
            let value = row.get(column).ok_or_else(|| ConversionError::MissingField {
                row: index,
                column: column.clone(),
            })?;
            values.push(coerce_value(value));
        }
    }

    let tensor = Array::from_shape_vec(IxDyn(&[rows, cols]), values)?;
    debug!("DataFrame -> tensor: shape [{}, {}]", rows, cols);
    Ok(tensor)
}

/// Convert a rank-2 tensor to a record set
///
/// `columns` names the second-axis entries in order. Entries beyond the
/// supplied names are dropped; names beyond the second axis are ignored. With
/// no names every row is an empty object.
///
/// The result is deferred to match the other conversions; nothing here
/// actually suspends.
///
/// # Errors
/// Returns [`ConversionError::InvalidShape`] if the tensor is not rank 2.
pub async fn tensor_to_dataframe(tensor: &Tensor, columns: Option<&[String]>) -> Result<DataFrame> {
    tensor_to_dataframe_sync(tensor, columns)
}

/// Blocking form of [`tensor_to_dataframe`]
pub fn tensor_to_dataframe_sync(tensor: &Tensor, columns: Option<&[String]>) -> Result<DataFrame> {
    if tensor.ndim() != 2 {
        return Err(ConversionError::InvalidShape(NOT_2D_MESSAGE.to_string()));
    }

    let width = tensor.shape()[1];
    let names: Vec<String> = columns
        .unwrap_or_default()
        .iter()
        .take(width)
        .cloned()
        .collect();

    let rows = tensor
        .outer_iter()
        .map(|values| {
            names
                .iter()
                .zip(values.iter())
                .map(|(name, &v)| (name.clone(), to_json_number(v)))
                .collect::<Row>()
        })
        .collect::<Vec<_>>();

    debug!(
        "tensor -> DataFrame: {} rows, {} of {} columns named",
        rows.len(),
        names.len(),
        width
    );
    DataFrame::new(rows, names)
}

/// Coerce a JSON value to `f32` with JavaScript `Number()` semantics
///
/// Booleans map to 1/0, `null` to 0, strings are trimmed and parsed as
/// decimal, `0x`/`0o`/`0b` or `Infinity` literals (blank is 0, anything
/// else is NaN), arrays and objects are NaN.
#[must_use]
pub fn coerce_value(value: &Value) -> f32 {
    match value {
        Value::Number(n) => n.as_f64().map_or(f32::NAN, |v| v as f32),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::String(s) => parse_number_string(s),
        Value::Array(_) | Value::Object(_) => f32::NAN,
    }
}

/// `Number("...")`: decimal literals, `0x`/`0o`/`0b` integers and `Infinity`
fn parse_number_string(s: &str) -> f32 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f32::NAN;
        }
        return digits.chars().fold(0.0_f64, |acc, c| {
            acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
        }) as f32;
    }

    match s {
        "Infinity" | "+Infinity" => return f32::INFINITY,
        "-Infinity" => return f32::NEG_INFINITY,
        _ => {}
    }

    // Rust also accepts "inf", "infinity" and "nan" in any case
    let decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !decimal {
        return f32::NAN;
    }
    s.parse::<f32>().unwrap_or(f32::NAN)
}

/// Integral values become JSON integers, non-finite values become `null`
fn to_json_number(value: f32) -> Value {
    let v = f64::from(value);
    if !v.is_finite() {
        return Value::Null;
    }
    if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(v as i64));
    }
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}
