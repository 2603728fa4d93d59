//! Disk manager - synchronous page I/O on a single data file.

use std::fs::File as StdFile;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rill_common::types::PageId;
use tracing::debug;

use super::error::{IoError, IoResult};
use super::options::OpenOptions;
use super::IO_ALIGNMENT;

/// Synchronous disk manager for a single data file.
///
/// Pages live at offset `page_id * page_size`. All operations are
/// positional and serialized through an internal mutex, so the manager can
/// be shared freely between threads.
///
/// The manager performs no caching of its own; that is the buffer pool's
/// job.
pub struct DiskManager {
    /// The underlying file, wrapped in a mutex for thread-safe access.
    file: Mutex<StdFile>,
    /// The file path.
    path: PathBuf,
    /// Page size in bytes.
    page_size: usize,
    /// Whether the file was opened with write access.
    writable: bool,
    /// Whether direct I/O is enabled; page I/O is then alignment-checked.
    direct_io: bool,
}

impl DiskManager {
    /// Opens a data file with the specified options.
    ///
    /// With direct I/O enabled the page size must be a multiple of
    /// [`IO_ALIGNMENT`], so every page offset and transfer length is
    /// aligned.
    pub fn open(
        path: impl AsRef<Path>,
        options: OpenOptions,
        page_size: usize,
    ) -> IoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let writable = options.write;
        let direct_io = options.direct_io;

        if direct_io && page_size % IO_ALIGNMENT != 0 {
            return Err(IoError::invalid_alignment(IO_ALIGNMENT, page_size));
        }

        let file = Self::open_file(&path, &options)?;

        debug!(path = %path.display(), page_size, "opened data file");

        Ok(Self {
            file: Mutex::new(file),
            path,
            page_size,
            writable,
            direct_io,
        })
    }

    fn open_file(path: &Path, options: &OpenOptions) -> IoResult<StdFile> {
        let mut std_opts = options.to_std_options();

        // Apply platform-specific direct I/O and sync flags
        #[cfg(target_os = "linux")]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut flags = 0;
            if options.direct_io {
                flags |= libc::O_DIRECT;
            }
            if options.sync {
                flags |= libc::O_SYNC;
            }
            if options.dsync {
                flags |= libc::O_DSYNC;
            }
            if flags != 0 {
                std_opts.custom_flags(flags);
            }
        }

        let file = std_opts
            .open(path)
            .map_err(|e| IoError::from_io_with_path(e, path))?;

        // macOS doesn't support O_DIRECT; set F_NOCACHE after opening
        #[cfg(target_os = "macos")]
        if options.direct_io {
            use std::os::unix::io::AsRawFd;
            unsafe {
                libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1);
            }
        }

        if let Some(size) = options.preallocate {
            Self::preallocate(&file, size)?;
        }

        Ok(file)
    }

    /// Pre-allocates file space.
    #[cfg(target_os = "linux")]
    fn preallocate(file: &StdFile, len: u64) -> IoResult<()> {
        use std::os::unix::io::AsRawFd;
        let ret = unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, len as i64) };
        if ret != 0 {
            return Err(IoError::Io {
                source: std::io::Error::from_raw_os_error(ret),
            });
        }
        Ok(())
    }

    /// Pre-allocates file space by extending the file length.
    #[cfg(not(target_os = "linux"))]
    fn preallocate(file: &StdFile, len: u64) -> IoResult<()> {
        let meta = file.metadata()?;
        if meta.len() < len {
            file.set_len(len)?;
        }
        Ok(())
    }

    /// Returns the file path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the page size this manager was opened with.
    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Reads the bytes of `page_id` into `buf`.
    ///
    /// `buf` must be exactly one page long. A read past the current end of
    /// file, or a short read at the tail, zero-fills the remainder: a page
    /// that has been allocated but never written back reads as zeroes.
    pub fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> IoResult<()> {
        if buf.len() != self.page_size {
            return Err(IoError::short_read(self.page_size, buf.len()));
        }

        let offset = page_id.byte_offset(self.page_size);
        if self.direct_io {
            self.check_alignment(buf.len(), offset)?;
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break, // EOF
                Ok(n) => total += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if total < buf.len() {
            buf[total..].fill(0);
        }

        Ok(())
    }

    /// Writes the bytes of `page_id` from `buf`.
    ///
    /// `buf` must be exactly one page long. Short writes are errors; the
    /// write is not synced (see [`DiskManager::sync`]).
    pub fn write_page(&self, page_id: PageId, buf: &[u8]) -> IoResult<()> {
        if !self.writable {
            return Err(IoError::InvalidOperation {
                operation: "write",
                mode: "read-only",
            });
        }
        if buf.len() != self.page_size {
            return Err(IoError::short_write(self.page_size, buf.len()));
        }

        let offset = page_id.byte_offset(self.page_size);
        if self.direct_io {
            self.check_alignment(buf.len(), offset)?;
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;

        Ok(())
    }

    /// Syncs all data and metadata to disk.
    pub fn sync(&self) -> IoResult<()> {
        let file = self.file.lock();
        file.sync_all()?;
        Ok(())
    }

    /// Returns the current file size in bytes.
    pub fn file_size(&self) -> IoResult<u64> {
        let file = self.file.lock();
        let meta = file.metadata()?;
        Ok(meta.len())
    }

    /// Rejects transfers direct I/O cannot perform.
    fn check_alignment(&self, len: usize, offset: u64) -> IoResult<()> {
        if len % IO_ALIGNMENT != 0 {
            return Err(IoError::invalid_alignment(IO_ALIGNMENT, len));
        }
        if offset % IO_ALIGNMENT as u64 != 0 {
            return Err(IoError::invalid_alignment(IO_ALIGNMENT, offset as usize));
        }
        Ok(())
    }
}

impl std::fmt::Debug for DiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskManager")
            .field("path", &self.path)
            .field("page_size", &self.page_size)
            .field("writable", &self.writable)
            .field("direct_io", &self.direct_io)
            .finish()
    }
}
