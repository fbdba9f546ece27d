//! Column-oriented "zipped object array" exchange format.
//!
//! Format: `{"fields": [name, ...], "values": [[v, ...], ...]}`
//!
//! Each row in `values` is positionally aligned with `fields`. Zipping a
//! list of objects and unzipping it again with the same field order gives
//! back the original rows.

use crate::utils::error::ParseError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single unzipped row
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZippedObjectArray {
    pub fields: Vec<String>,
    pub values: Vec<Vec<Value>>,
}

impl ZippedObjectArray {
    /// Zip objects into columns
    ///
    /// # Arguments
    /// * `rows` - Objects to zip
    /// * `fields` - Column order; defaults to the key order of the first row
    ///
    /// # Errors
    /// * `ParseError::MissingField` - a row lacks one of the fields.
    ///   Keys not listed in `fields` are dropped.
    pub fn zip(rows: &[Row], fields: Option<&[String]>) -> Result<Self, ParseError> {
        let fields: Vec<String> = match fields {
            Some(fields) => fields.to_vec(),
            None => rows
                .first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default(),
        };

        let values = rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                fields
                    .iter()
                    .map(|field| {
                        row.get(field).cloned().ok_or_else(|| ParseError::MissingField {
                            row: row_idx,
                            field: field.clone(),
                        })
                    })
                    .collect::<Result<Vec<Value>, ParseError>>()
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(Self { fields, values })
    }

    /// Zip any serializable records; each must serialize to a JSON object
    pub fn zip_serialize<T: Serialize>(
        items: &[T],
        fields: Option<&[String]>,
    ) -> Result<Self, ParseError> {
        let rows = items
            .iter()
            .map(|item| match serde_json::to_value(item)? {
                Value::Object(map) => Ok(map),
                other => Err(ParseError::InvalidFormat(format!(
                    "Expected an object to zip, found {}",
                    other
                ))),
            })
            .collect::<Result<Vec<Row>, ParseError>>()?;

        Self::zip(&rows, fields)
    }

    /// Unzip columns back into objects
    ///
    /// # Errors
    /// * `ParseError::RowWidth` - a row does not have one value per field
    pub fn unzip(&self) -> Result<Vec<Row>, ParseError> {
        self.values
            .iter()
            .enumerate()
            .map(|(row_idx, values)| {
                self.check_width(row_idx, values)?;
                Ok(self
                    .fields
                    .iter()
                    .cloned()
                    .zip(values.iter().cloned())
                    .collect())
            })
            .collect()
    }

    /// Unzip straight into typed records
    pub fn unzip_deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>, ParseError> {
        self.unzip()?
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)).map_err(ParseError::from))
            .collect()
    }

    /// Field name → column index
    pub fn header(&self) -> HashMap<&str, usize> {
        self.fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.as_str(), idx))
            .collect()
    }

    pub fn column(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn check_width(&self, row: usize, values: &[Value]) -> Result<(), ParseError> {
        if values.len() != self.fields.len() {
            return Err(ParseError::RowWidth {
                row,
                expected: self.fields.len(),
                found: values.len(),
            });
        }
        Ok(())
    }
}
