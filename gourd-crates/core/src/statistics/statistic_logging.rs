//! The process-wide destination of statistics: every statistic is written as a line
//! `{prefix} {name}={value}`, and an optional closing line marks the end of a block of statistics.
use std::fmt::Display;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

/// Where and how statistics are written.
pub struct StatisticOutput {
    /// Written in front of every statistic.
    pub prefix: &'static str,
    /// Written after a block of statistics, if present.
    pub closing_line: Option<&'static str>,
    /// The casing applied to the names of the statistics; names are kept as they are if absent.
    pub casing: Option<Case>,
    pub writer: Box<dyn Write + Send>,
}

impl std::fmt::Debug for StatisticOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticOutput")
            .field("prefix", &self.prefix)
            .field("closing_line", &self.closing_line)
            .field("casing", &self.casing)
            .finish_non_exhaustive()
    }
}

impl StatisticOutput {
    /// Statistics prefixed with `prefix` written to stdout.
    pub fn stdout(prefix: &'static str) -> Self {
        StatisticOutput {
            prefix,
            closing_line: None,
            casing: None,
            writer: Box::new(std::io::stdout()),
        }
    }

    fn write_line(&mut self, line: impl Display) {
        // statistics are best effort, a failing writer does not affect solving
        let _ = writeln!(self.writer, "{line}");
    }
}

static STATISTIC_OUTPUT: OnceLock<Mutex<StatisticOutput>> = OnceLock::new();

/// Installs the destination of the statistics. Nothing is written before this is called, and
/// only the first configuration takes effect.
pub fn configure_statistic_logging(output: StatisticOutput) {
    let _ = STATISTIC_OUTPUT.get_or_init(|| Mutex::new(output));
}

/// Whether statistics are written anywhere.
pub fn should_log_statistics() -> bool {
    STATISTIC_OUTPUT.get().is_some()
}

fn with_output(action: impl FnOnce(&mut StatisticOutput)) {
    if let Some(Ok(mut output)) = STATISTIC_OUTPUT.get().map(Mutex::lock) {
        action(&mut output);
    }
}

/// Writes the statistic `name` with `value`.
pub fn log_statistic(name: impl Display, value: impl Display) {
    with_output(|output| {
        let name = match output.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let prefix = output.prefix;
        output.write_line(format_args!("{prefix} {name}={value}"));
    });
}

/// Writes the closing line, if one was configured.
pub fn log_statistic_postfix() {
    with_output(|output| {
        if let Some(closing_line) = output.closing_line {
            output.write_line(closing_line);
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("not poisoned").write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn statistics_are_written_with_prefix_casing_and_closing_line() {
        let buffer = SharedBuffer::default();
        configure_statistic_logging(StatisticOutput {
            prefix: "%%%mzn-stat:",
            closing_line: Some("%%%mzn-stat-end"),
            casing: Some(Case::Camel),
            writer: Box::new(buffer.clone()),
        });
        assert!(should_log_statistics());

        log_statistic("newton_declines", 3);
        log_statistic_postfix();

        let written = String::from_utf8(buffer.0.lock().expect("not poisoned").clone())
            .expect("utf-8 output");
        assert_eq!("%%%mzn-stat: newtonDeclines=3\n%%%mzn-stat-end\n", written);
    }
}
