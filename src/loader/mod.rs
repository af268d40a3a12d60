mod batch_reader;
mod file_finder;

// Re-export public API
pub use batch_reader::{check_batches, load_batches, load_from_dir, BatchCheck, LoadedBatches};
pub use file_finder::find_batch_files;
