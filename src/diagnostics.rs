use std::io::Write;

use log::warn;

use crate::scanner::ScanningError;

/// Collects the errors reported while running some code.
///
/// This is what decides whether a run failed: a script with any reported error exits with a
/// non-zero status, the REPL resets it before every entry.
pub struct Diagnostics<W: Write> {
    writer: W,
    error_count: usize,
}

impl<W: Write> Diagnostics<W> {
    pub fn new(writer: W) -> Diagnostics<W> {
        Diagnostics {
            writer,
            error_count: 0,
        }
    }

    pub fn report(&mut self, line: usize, location: &str, message: &str) {
        if let Err(err) = writeln!(self.writer, "[line {line}] Error {location}: {message}") {
            // the error still counts even if we could not show it
            warn!("unable to write diagnostic: {err}");
        }
        self.error_count += 1;
    }

    pub fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message)
    }

    pub fn scanning_error(&mut self, err: ScanningError) {
        self.error(err.line(), &format!("{err}"))
    }

    pub fn had_error(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::Diagnostics;
    use crate::scanner::ScanningError;

    fn output(diagnostics: &Diagnostics<Vec<u8>>) -> String {
        String::from_utf8(diagnostics.writer().clone()).unwrap()
    }

    #[test]
    fn test_report_format() {
        let mut diagnostics = Diagnostics::new(Vec::<u8>::new());
        diagnostics.report(3, "at 'x'", "Something is off.");
        diagnostics.error(4, "Unexpected character.");
        assert_eq!(
            output(&diagnostics),
            "[line 3] Error at 'x': Something is off.\n[line 4] Error : Unexpected character.\n"
        );
        assert_eq!(diagnostics.error_count(), 2);
    }

    #[test]
    fn test_scanning_error_uses_its_line() {
        let mut diagnostics = Diagnostics::new(Vec::<u8>::new());
        diagnostics.scanning_error(ScanningError::UnterminatedString {
            line: 7,
            string_start: "\"abc".to_string(),
        });
        assert_eq!(output(&diagnostics), "[line 7] Error : Unterminated string.\n");
    }

    #[test]
    fn test_reset_clears_error_state() {
        let mut diagnostics = Diagnostics::new(Vec::<u8>::new());
        assert!(!diagnostics.had_error());
        diagnostics.error(1, "Unexpected character.");
        assert!(diagnostics.had_error());
        diagnostics.reset();
        assert!(!diagnostics.had_error());
        assert_eq!(diagnostics.error_count(), 0);
    }
}
