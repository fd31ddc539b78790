use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use log::{debug, LevelFilter};

pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// How the process-wide logger is set up.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Console and file level; `RUST_LOG` takes precedence when set.
    pub level: LevelFilter,
    /// Directory for daily log files; `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
    /// File name stem, e.g. `guacamol-eval` → `guacamol-eval.2024-05-01.log`.
    pub file_stem: String,
    /// Days a log file is kept before it is deleted at start-up.
    pub retention_days: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: LevelFilter::Info,
            log_dir: None,
            file_stem: env!("CARGO_PKG_NAME").to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Install the global logger. Call once, at start-up.
///
/// Every record goes to stderr and, when a log directory is configured, to
/// that day's log file.
pub fn init(config: &LogConfig) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level).parse_default_env();

    let mut pruned = Vec::new();
    let mut file_sink = None;
    if let Some(dir) = &config.log_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;

        let today = Local::now().date_naive();
        for stale in expired_logs(dir, &config.file_stem, today, config.retention_days)? {
            fs::remove_file(&stale)
                .with_context(|| format!("removing old log {}", stale.display()))?;
            pruned.push(stale);
        }

        let daily = DailyFile::open(dir, &config.file_stem, today)?;
        file_sink = Some(daily.path());
        builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} | {:<5} | {}:{} - {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.module_path().unwrap_or("?"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            })
            .target(env_logger::Target::Pipe(Box::new(Tee {
                console: io::stderr(),
                file: daily,
            })));
    } else {
        builder.format_timestamp_millis();
    }

    builder.try_init().context("installing logger")?;

    if let Some(path) = file_sink {
        debug!(
            "Logging at {} to {} (daily rotation, {} day retention)",
            config.level,
            path.display(),
            config.retention_days
        );
    }
    for stale in pruned {
        debug!("Removed expired log {}", stale.display());
    }
    Ok(())
}

/// Flush buffered log output. Call before the process exits.
pub fn shutdown() {
    log::logger().flush();
}

// ---------------------------------------------------------------------------
// Daily log files
// ---------------------------------------------------------------------------

fn log_file_name(stem: &str, date: NaiveDate) -> String {
    format!("{stem}.{}.log", date.format("%Y-%m-%d"))
}

/// Date encoded in a log file name written by this module.
fn log_file_date(stem: &str, name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix(stem)?.strip_prefix('.')?.strip_suffix(".log")?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Log files of `stem` in `dir` older than `retention_days`.
///
/// A window reaching past the earliest representable date expires nothing.
pub fn expired_logs(
    dir: &Path,
    stem: &str,
    today: NaiveDate,
    retention_days: u32,
) -> Result<Vec<PathBuf>> {
    let mut expired = Vec::new();
    let Some(cutoff) = today.checked_sub_days(Days::new(u64::from(retention_days))) else {
        return Ok(expired);
    };

    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(|n| log_file_date(stem, n)) else {
            continue;
        };
        if date < cutoff {
            expired.push(entry.path());
        }
    }
    expired.sort();
    Ok(expired)
}

/// Append-only log file that moves to a new file when the date changes.
struct DailyFile {
    dir: PathBuf,
    stem: String,
    date: NaiveDate,
    file: File,
}

impl DailyFile {
    fn open(dir: &Path, stem: &str, date: NaiveDate) -> Result<Self> {
        let path = dir.join(log_file_name(stem, date));
        let file = append(&path).with_context(|| format!("opening log file {}", path.display()))?;
        Ok(DailyFile {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            date,
            file,
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(log_file_name(&self.stem, self.date))
    }

    /// Switch to the file for `date` if it differs from the current one.
    fn roll_to(&mut self, date: NaiveDate) -> io::Result<()> {
        if date != self.date {
            self.file.flush()?;
            self.file = append(&self.dir.join(log_file_name(&self.stem, date)))?;
            self.date = date;
        }
        Ok(())
    }
}

fn append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for DailyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.roll_to(Local::now().date_naive())?;
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Writes every record to the console and the daily file.
struct Tee<C: Write> {
    console: C,
    file: DailyFile,
}

impl<C: Write> Write for Tee<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn file_names_round_trip_their_date() {
        let name = log_file_name("guacamol-eval", day(2024, 5, 1));
        assert_eq!(name, "guacamol-eval.2024-05-01.log");
        assert_eq!(log_file_date("guacamol-eval", &name), Some(day(2024, 5, 1)));
        assert_eq!(log_file_date("other", &name), None);
        assert_eq!(log_file_date("guacamol-eval", "guacamol-eval.latest.log"), None);
    }

    #[test]
    fn only_old_files_of_the_stem_expire() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "eval.2024-04-20.log",
            "eval.2024-04-24.log",
            "eval.2024-04-30.log",
            "other.2024-01-01.log",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let expired = expired_logs(dir.path(), "eval", day(2024, 5, 1), 7).unwrap();
        assert_eq!(expired, vec![dir.path().join("eval.2024-04-20.log")]);
    }

    #[test]
    fn retention_window_never_drops_today() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eval.2024-05-01.log"), "").unwrap();
        fs::write(dir.path().join("eval.2024-04-30.log"), "").unwrap();

        let expired = expired_logs(dir.path(), "eval", day(2024, 5, 1), 0).unwrap();
        assert_eq!(expired, vec![dir.path().join("eval.2024-04-30.log")]);
    }

    #[test]
    fn huge_retention_expires_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eval.2024-04-20.log"), "").unwrap();

        let expired = expired_logs(dir.path(), "eval", day(2024, 5, 1), u32::MAX).unwrap();
        assert!(expired.is_empty());
    }

    #[test]
    fn daily_file_rolls_over() {
        let dir = tempfile::tempdir().unwrap();
        let mut daily = DailyFile::open(dir.path(), "eval", day(2024, 5, 1)).unwrap();
        daily.file.write_all(b"first\n").unwrap();
        daily.roll_to(day(2024, 5, 2)).unwrap();
        daily.file.write_all(b"second\n").unwrap();
        daily.flush().unwrap();

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("eval.2024-05-01.log"), "first\n");
        assert_eq!(read("eval.2024-05-02.log"), "second\n");
        assert_eq!(daily.path(), dir.path().join("eval.2024-05-02.log"));
    }

    #[test]
    fn tee_writes_both_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let today = Local::now().date_naive();
        let mut tee = Tee {
            console: Vec::new(),
            file: DailyFile::open(dir.path(), "eval", today).unwrap(),
        };
        tee.write_all(b"hello\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(tee.console, b"hello\n");
        let path = tee.file.path();
        assert_eq!(fs::read_to_string(path).unwrap(), "hello\n");
    }
}
