//! Address list persistence.
//!
//! The file is truncated as soon as the run starts, so a failed run leaves an
//! empty list rather than stale addresses from the previous container.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::net::Ipv6Addr;
use std::path::{Path, PathBuf};

/// Line-oriented writer for the address list.
pub struct ListWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl ListWriter {
    /// Create or truncate the list file, creating parent directories.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn append(&mut self, addr: Ipv6Addr) -> io::Result<()> {
        writeln!(self.out, "{}", addr)?;
        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered lines and sync the file to disk.
    pub fn finish(mut self) -> io::Result<usize> {
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        Ok(self.written)
    }
}
