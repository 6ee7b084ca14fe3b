//! Size-capped rotating file writer
//!
//! Backs the file sinks. The active file is `<file>`; rotated files are
//! numbered `<file>.1` (newest) through `<file>.N`, optionally gzipped to
//! `<file>.N.gz`. Backups older than the age cap are pruned after every
//! rotation.

use crate::core::error::{LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const BYTES_PER_MB: u64 = 1024 * 1024;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Rotation caps for a [`RotatingWriter`]
///
/// # Examples
///
/// ```
/// use multilog::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(10)
///     .with_max_backups(3)
///     .with_max_age_days(7);
/// assert_eq!(policy.max_bytes, 10 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size at which the active file is rotated
    pub max_bytes: u64,
    /// Rotated files to keep; zero keeps a single backup
    pub max_backups: usize,
    /// Rotated files older than this are deleted; `None` keeps them
    pub max_age: Option<Duration>,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 5 * BYTES_PER_MB,
            max_backups: 1,
            max_age: Some(Duration::from_secs(SECONDS_PER_DAY)),
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_bytes = megabytes.saturating_mul(BYTES_PER_MB);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    /// Age cap in days; zero disables age pruning.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age = (days > 0).then(|| Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY)));
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    fn backups_to_keep(&self) -> usize {
        self.max_backups.max(1)
    }
}

/// `io::Write` over a file that rotates itself once it reaches its size cap
///
/// # Examples
///
/// ```no_run
/// use multilog::sinks::{RotatingWriter, RotationPolicy};
/// use std::io::Write;
///
/// let mut writer = RotatingWriter::new("/var/log/app.log", RotationPolicy::default()).unwrap();
/// writer.write_all(b"hello\n").unwrap();
/// ```
#[derive(Debug)]
pub struct RotatingWriter {
    base_path: PathBuf,
    policy: RotationPolicy,
    file: Option<File>,
    current_size: u64,
}

impl RotatingWriter {
    /// Open (or create) `path` for appending, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            file: Some(file),
            current_size,
        })
    }

    fn open(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
            })?;
        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();
        Ok((file, size))
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    fn should_rotate(&self, incoming: usize) -> bool {
        self.current_size > 0 && self.current_size + incoming as u64 > self.policy.max_bytes
    }

    /// Path of backup number `index`.
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("multilog.log")
            .to_string();
        path.set_file_name(format!("{}.{}", filename, index));
        path
    }

    fn compressed(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    }

    /// Close the active file, shift backups up by one and start a new file.
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let keep = self.policy.backups_to_keep();
        for oldest in [self.backup_path(keep), Self::compressed(&self.backup_path(keep))] {
            if oldest.exists() {
                if let Err(e) = fs::remove_file(&oldest) {
                    eprintln!("[MULTILOG WARN] Failed to remove oldest backup {}: {}", oldest.display(), e);
                }
            }
        }

        for i in (1..keep).rev() {
            let old_path = self.backup_path(i);
            let new_path = self.backup_path(i + 1);
            let old_compressed = Self::compressed(&old_path);
            if old_compressed.exists() {
                fs::rename(&old_compressed, Self::compressed(&new_path)).map_err(|e| {
                    LoggerError::file_rotation(
                        old_compressed.display().to_string(),
                        format!("Failed to rotate backup files: {}", e),
                    )
                })?;
            } else if old_path.exists() {
                fs::rename(&old_path, &new_path).map_err(|e| {
                    LoggerError::file_rotation(
                        old_path.display().to_string(),
                        format!("Failed to rotate backup files: {}", e),
                    )
                })?;
            }
        }

        let backup_path = self.backup_path(1);
        if self.base_path.exists() {
            fs::rename(&self.base_path, &backup_path).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
            if self.policy.compress {
                compress_file(&backup_path)?;
            }
        }

        let (file, size) = Self::open(&self.base_path)?;
        self.file = Some(file);
        self.current_size = size;

        self.prune_expired();
        Ok(())
    }

    /// Delete backups whose modification time is older than the age cap.
    fn prune_expired(&self) {
        let Some(max_age) = self.policy.max_age else {
            return;
        };
        let now = SystemTime::now();
        for index in 1..=self.policy.backups_to_keep() {
            let plain = self.backup_path(index);
            for path in [Self::compressed(&plain), plain] {
                let expired = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age > max_age);
                if expired {
                    if let Err(e) = fs::remove_file(&path) {
                        eprintln!("[MULTILOG WARN] Failed to remove expired backup {}: {}", path.display(), e);
                    }
                }
            }
        }
    }

    fn recover_after_failed_rotation(&mut self) -> io::Result<()> {
        if self.file.is_none() {
            let (file, size) = Self::open(&self.base_path).map_err(io::Error::other)?;
            self.file = Some(file);
            self.current_size = size;
        }
        // Let the current file grow past the cap rather than retry on every write.
        self.current_size = 0;
        Ok(())
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate(buf.len()) {
            if let Err(e) = self.rotate() {
                eprintln!("[MULTILOG WARN] Log rotation failed: {}. Continuing with current file.", e);
                self.recover_after_failed_rotation()?;
            }
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "log file is not open"))?;
        let written = file.write(buf)?;
        self.current_size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Gzip `path` into `<path>.gz`, removing the original only on success.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let gz_path = RotatingWriter::compressed(path);
    let mut temp_name = gz_path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let compress = || -> io::Result<()> {
        let mut reader = BufReader::new(File::open(path)?);
        let output = BufWriter::new(File::create(&temp_path)?);
        let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?.flush()?;
        fs::rename(&temp_path, &gz_path)
    };

    if let Err(e) = compress() {
        let _ = fs::remove_file(&temp_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[MULTILOG WARN] Compressed {} but failed to remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(())
}
