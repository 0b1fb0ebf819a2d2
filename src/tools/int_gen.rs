use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::{HuffError, Result};

/// Write `count` integers as `"n, "` text, cycling through 1..=100. The output
/// is plain ASCII with a heavily skewed symbol distribution.
pub fn int_gen<W: Write>(out: &mut W, count: usize) -> io::Result<()> {
    for i in 0..count {
        write!(out, "{}, ", i % 100 + 1)?;
    }
    Ok(())
}

/// Generate the integer file at `path`. Returns the number of bytes written.
pub fn int_gen_file(path: &Path, count: usize) -> Result<u64> {
    let file = File::create(path).map_err(|source| HuffError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    int_gen(&mut writer, count)?;
    writer.flush()?;

    let written = writer.get_ref().metadata()?.len();
    info!("Generated {} integers ({} bytes) in {}", count, written, path.display());
    Ok(written)
}
