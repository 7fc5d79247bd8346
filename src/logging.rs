use log::Log;
use systemd_journal_logger::JournalLog;

/// Journal logger that lets this crate through at info (debug when the debug
/// toggle is on) and everything else at warn.
struct FilteredJournal {
    inner: JournalLog,
}

impl Log for FilteredJournal {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let target = metadata.target();
        if target.starts_with("bucketlist") {
            let max = if crate::debug_logging() {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            };
            metadata.level() <= max
        } else {
            metadata.level() <= log::LevelFilter::Warn
        }
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Send logs to the systemd journal (`journalctl --user -t <identifier> -f`).
///
/// Without a journal socket the process keeps running unlogged.
pub fn init(identifier: &str, debug: bool) {
    crate::set_debug_logging(debug);

    let journal = match JournalLog::new() {
        Ok(j) => j.with_syslog_identifier(identifier.to_string()),
        Err(e) => {
            eprintln!("{}: journal unavailable, logging disabled: {}", identifier, e);
            return;
        }
    };

    if let Err(e) = log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })) {
        eprintln!("{}: logger already installed: {}", identifier, e);
        return;
    }
    // Global max must be Debug so debug logs can pass when toggled
    log::set_max_level(log::LevelFilter::Debug);
}
