use crate::config::Config;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "kairos-pulse.log";

/// Keeps the log file handle alive for the lifetime of the session.
pub struct LogGuard {
    file: Option<Arc<Mutex<File>>>,
}

impl LogGuard {
    pub fn is_file_backed(&self) -> bool {
        self.file.is_some()
    }
}

struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for SharedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock() {
            Ok(mut file) => file.write(buf),
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

/// The dashboard owns the terminal, so events go to the log file, to stdout
/// only when `KAIROS_LOG_STDOUT` is set, and to a sink otherwise.
pub fn init_logging(config: &Config) -> LogGuard {
    let level = if config.debug {
        "debug".to_string()
    } else if let Ok(level) = std::env::var("KAIROS_LOG_LEVEL") {
        level
    } else {
        "info".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = match config.log_dir.as_deref().map(open_log_file).transpose() {
        Ok(file) => file,
        Err(err) => {
            eprintln!("log_file_error: {err}");
            None
        }
    };

    let make_writer = if let Some(file) = file.clone() {
        BoxMakeWriter::new(move || SharedFileWriter { file: file.clone() })
    } else if env_true("KAIROS_LOG_STDOUT") {
        BoxMakeWriter::new(io::stdout)
    } else {
        BoxMakeWriter::new(io::sink)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(make_writer)
        .try_init();
    LogGuard { file }
}

fn open_log_file(dir: &Path) -> io::Result<Arc<Mutex<File>>> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))?;
    Ok(Arc::new(Mutex::new(file)))
}

fn env_true(key: &str) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}
