//! Utilities related to writing output files.

use std::fs;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes a file by first writing to a temporary file in the destination's
/// directory and then renaming it over the destination. Readers never observe a
/// partially written file at `dst`: it either does not exist, holds its previous
/// contents, or holds the complete new contents.
///
/// Missing parent directories are created.
pub fn write_atomically<P, F>(dst: P, write: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dst = dst.as_ref();
    let directory = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(directory)?;

    let mut file = NamedTempFile::new_in(directory)?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    file.as_file().sync_all()?;
    file.persist(dst).map_err(|e| e.error)?;

    Ok(())
}
