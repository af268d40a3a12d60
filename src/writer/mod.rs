mod dataset_writer;
mod flatten;

// Re-export public API
pub use dataset_writer::{
    run_stamp, unique_stamp, write_csv, write_datasets, write_json, write_parquet,
    WrittenArtifacts,
};
pub use flatten::{flatten_record, records_to_dataframe};
