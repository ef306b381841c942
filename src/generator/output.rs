use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use super::{GeneratedFile, GeneratorError};

/// Writes the file into `directory`, replacing any existing file of the same name.
///
/// The content goes to a temporary file in the same directory first, a failed write leaves the previous file intact.
pub fn write_atomically(directory: &Path, file: &GeneratedFile) -> Result<PathBuf, GeneratorError> {
    let target = directory.join(&file.name);

    let mut temporary = NamedTempFile::new_in(directory)?;
    temporary.write_all(&file.content)?;
    temporary.flush()?;
    temporary
        .persist(&target)
        .map_err(|error| error.error)?;

    info!("wrote {}", target.display());
    Ok(target)
}
