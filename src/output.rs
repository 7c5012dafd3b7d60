//! File-system backed output surfaces.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use ticketpress_traits::{DocumentSink, EncodedDocument, OutputError, PrintHandle, PrintSurface};

fn write_document(path: &Path, document: EncodedDocument) -> Result<u64, OutputError> {
    let mut out = BufWriter::new(File::create(path)?);
    let written = document.copy_to(&mut out)?;
    out.flush()?;
    Ok(written)
}

/// Saves downloads into one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSink for DirectorySink {
    fn persist(&self, file_name: &str, document: EncodedDocument) -> Result<PathBuf, OutputError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        let written = write_document(&path, document)?;
        log::debug!("Wrote {} bytes to {}", written, path.display());
        Ok(path)
    }
}

/// A print "window" backed by a file in a spool directory. `prepare`
/// reserves the file before rendering starts; `close` removes it.
#[derive(Debug, Clone)]
pub struct SpoolPrintSurface {
    dir: PathBuf,
}

impl SpoolPrintSurface {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn reserve(&self) -> Result<PathBuf, OutputError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| OutputError::Unavailable(format!("{}: {}", self.dir.display(), e)))?;
        let (_, path) = tempfile::Builder::new()
            .prefix("print-")
            .suffix(".pdf")
            .tempfile_in(&self.dir)?
            .keep()
            .map_err(|e| OutputError::Io(e.error))?;
        Ok(path)
    }
}

impl PrintSurface for SpoolPrintSurface {
    fn prepare(&self) -> Result<PrintHandle, OutputError> {
        self.reserve().map(PrintHandle)
    }

    fn show(&self, handle: &PrintHandle, document: EncodedDocument) -> Result<PathBuf, OutputError> {
        write_document(handle.path(), document)?;
        Ok(handle.path().to_path_buf())
    }

    fn open(&self, document: EncodedDocument) -> Result<PathBuf, OutputError> {
        let path = self.reserve()?;
        write_document(&path, document)?;
        Ok(path)
    }

    fn close(&self, handle: PrintHandle) {
        if let Err(e) = fs::remove_file(handle.path()) {
            log::debug!("Could not remove {}: {}", handle.path().display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_creates_directory_and_file() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path().join("nested"));
        let path = sink
            .persist("tickets_1-6.pdf", EncodedDocument::Memory(b"%PDF".to_vec()))
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "tickets_1-6.pdf");
        assert_eq!(fs::read(&path).unwrap(), b"%PDF");
    }

    #[test]
    fn prepared_print_file_is_shown_or_closed() {
        let root = tempfile::tempdir().unwrap();
        let surface = SpoolPrintSurface::new(root.path());

        let handle = surface.prepare().unwrap();
        assert!(handle.path().exists());
        let shown = surface
            .show(&handle, EncodedDocument::Memory(b"%PDF-1.7".to_vec()))
            .unwrap();
        assert_eq!(fs::read(shown).unwrap(), b"%PDF-1.7");

        let unused = surface.prepare().unwrap();
        let path = unused.path().to_path_buf();
        surface.close(unused);
        assert!(!path.exists());
    }
}
