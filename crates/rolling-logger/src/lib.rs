//! Rolling file logger
//!
//! Installs a global `tracing` subscriber, which also receives `log` records,
//! writing to stderr and to `<dir>/<app>.log`. Once the file grows past
//! [`MAX_FILE_BYTES`] it is rotated to `<app>.1.log`, `<app>.2.log`, ...
//! keeping at most [`MAX_BACKUPS`] old files. The most recent lines are also
//! kept in memory for display in a diagnostics view.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::prelude::*;

/// Size at which the active log file is rotated
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;
/// Rotated files kept besides the active one
pub const MAX_BACKUPS: usize = 3;
/// Lines kept by [`recent_lines`]
pub const RECENT_CAPACITY: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Failed to prepare log file: {0}")]
    Io(#[from] io::Error),
    #[error("Logger already initialized")]
    AlreadyInitialized,
    #[error("Logger not initialized")]
    NotInitialized,
}

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();
static RECENT: Mutex<VecDeque<String>> = Mutex::new(VecDeque::new());

/// Install the global logger writing into `dir`.
///
/// Can be called once per process; later calls return
/// [`LoggerError::AlreadyInitialized`].
pub fn init_logger(dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    if LOG_FILE.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let file = RollingFile::open(dir.as_ref(), app_name, MAX_FILE_BYTES, MAX_BACKUPS)?;
    let path = file.path();
    let writer = SharedWriter(Arc::new(Mutex::new(file)));

    let stderr_layer = fmt::layer().with_timer(LocalTime).with_writer(io::stderr);
    let file_layer = fmt::layer()
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_writer(move || writer.clone());

    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    let _ = LOG_FILE.set(path.clone());
    log::info!("Logging to {}", path.display());
    Ok(())
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", message);
    Ok(())
}

/// The most recent log lines, oldest first
pub fn recent_lines() -> Vec<String> {
    match RECENT.lock() {
        Ok(recent) => recent.iter().cloned().collect(),
        Err(_) => Vec::new(),
    }
}

fn ensure_initialized() -> Result<(), LoggerError> {
    LOG_FILE.get().map(|_| ()).ok_or(LoggerError::NotInitialized)
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn remember(recent: &mut VecDeque<String>, buf: &[u8], capacity: usize) {
    for line in String::from_utf8_lossy(buf).lines().filter(|line| !line.trim().is_empty()) {
        recent.push_back(line.to_string());
    }
    while recent.len() > capacity {
        recent.pop_front();
    }
}

#[derive(Clone)]
struct SharedWriter(Arc<Mutex<RollingFile>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut recent) = RECENT.lock() {
            remember(&mut recent, buf, RECENT_CAPACITY);
        }
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

/// Append-only file that rotates itself by size
struct RollingFile {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_backups: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    fn open(dir: &Path, app_name: &str, max_bytes: u64, max_backups: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes,
            max_backups,
            file,
            written,
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}.log", self.app_name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_backups == 0 {
            fs::remove_file(self.path())?;
        } else {
            let oldest = self.backup_path(self.max_backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.max_backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(self.path(), self.backup_path(1))?;
        }

        self.file = OpenOptions::new().create(true).append(true).open(self.path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
