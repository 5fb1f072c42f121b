pub mod reader;
pub mod writer;

use crate::error::{CliError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub use reader::read_table;

/// Creates `path` and hands a buffered writer to `write`, attributing any failure to the path.
pub fn write_output<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> std::result::Result<(), csv::Error>,
{
    info!("Writing {:?}", path);
    let file = File::create(path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    write(BufWriter::new(file)).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
