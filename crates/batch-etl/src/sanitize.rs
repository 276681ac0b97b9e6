//! Column and value sanitisation used by the bundled pipelines.

use crate::error::Result;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Normalise a column name to `snake_case` ASCII.
///
/// Runs of anything that is not an ASCII letter or digit collapse into a
/// single underscore. A name with nothing left becomes `column`.
pub fn sanitize_column_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !cleaned.is_empty() {
                cleaned.push('_');
            }
            pending_separator = false;
            cleaned.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if cleaned.is_empty() {
        "column".to_string()
    } else {
        cleaned
    }
}

/// Rename every column of `df` with [`sanitize_column_name`].
///
/// Names that collide after cleaning get a numeric suffix (`id`, `id_2`, ...).
pub fn sanitize_column_names(mut df: DataFrame) -> Result<DataFrame> {
    let original: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut taken: HashSet<String> = HashSet::with_capacity(original.len());
    let mut renamed: Vec<PlSmallStr> = Vec::with_capacity(original.len());

    for name in &original {
        let base = sanitize_column_name(name);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if &candidate != name {
            debug!("Renaming column '{}' -> '{}'", name, candidate);
        }
        taken.insert(candidate.clone());
        renamed.push(candidate.into());
    }

    df.set_column_names(renamed)?;
    Ok(df)
}

/// Trim surrounding whitespace from every string value.
///
/// Values that are empty after trimming become null.
pub fn trim_string_columns(mut df: DataFrame) -> Result<DataFrame> {
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }

        let cleaned: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|value| {
                value
                    .map(str::trim)
                    .filter(|trimmed| !trimmed.is_empty())
                    .map(str::to_string)
            })
            .collect();

        let cleaned_series = Series::new(col_name.as_str().into(), cleaned);
        df.replace(col_name, cleaned_series)?;
    }

    Ok(df)
}
