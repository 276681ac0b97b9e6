//! Ready-made pipelines built on the core skeleton.

mod csv_to_parquet;

pub use csv_to_parquet::CsvToParquet;
