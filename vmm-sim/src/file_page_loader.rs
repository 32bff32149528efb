//! FilePageLoader - backing store read straight from a flat file.
//!
//! The file is the whole virtual address space laid out page after page:
//! page `n` occupies bytes `[n * PAGE_SIZE, (n + 1) * PAGE_SIZE)`. Every
//! page fault seeks to that position and reads exactly one page; a file
//! that ends early fails the read instead of zero-filling.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use log::trace;
use vmm::{address::PAGE_SIZE, error::Result, PageLoader, VmError};

#[derive(Debug)]
pub struct FilePageLoader<R = File> {
    source: R,
    path: PathBuf,
}

impl FilePageLoader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FilePageLoader> {
        let path = path.as_ref().to_path_buf();

        let source = File::open(&path).map_err(|err| {
            VmError::backing_store(format!("cannot open {}", path.display()), err)
        })?;

        Ok(FilePageLoader::from_reader(source, path))
    }
}

impl<R: Read + Seek> FilePageLoader<R> {
    pub fn from_reader(source: R, name: impl Into<PathBuf>) -> Self {
        FilePageLoader {
            source,
            path: name.into(),
        }
    }
}

impl<R: Read + Seek> PageLoader for FilePageLoader<R> {
    fn load_page_into(&mut self, page_number: usize, target: &mut [u8]) -> Result<()> {
        let position = (page_number * PAGE_SIZE) as u64;

        self.source
            .seek(SeekFrom::Start(position))
            .and_then(|_| self.source.read_exact(target))
            .map_err(|err| {
                VmError::backing_store(
                    format!(
                        "cannot read page {:#05X} at byte {} of {}",
                        page_number,
                        position,
                        self.path.display()
                    ),
                    err,
                )
            })?;

        trace!(
            "file_page_loader: page {:#05X} head {}",
            page_number,
            hex::encode(&target[..target.len().min(8)])
        );

        Ok(())
    }
}
