use std::fs::read_to_string;
use std::io;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use log::info;
use thiserror::Error;

use crate::diagnostics::Diagnostics;
use crate::repl::MultilineInput;
use crate::scanner::tokenize;

mod diagnostics;
mod repl;
mod scanner;
#[cfg(test)]
mod test_helpers;
mod token;

// exit statuses from sysexits.h
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;

/// Scan a Lox script (or lines typed at the prompt) and print its tokens.
#[derive(Parser, Debug)]
#[command(name = "rlox", version, about, long_about = None)]
struct Cli {
    /// Script to scan. Starts an interactive prompt when omitted.
    script: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CLIError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("file does not seem to exist {0}")]
    FileDoesNotExist(String),
}

fn main() -> Result<ExitCode, color_eyre::eyre::Error> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            info!("invalid arguments: {err}");
            println!("Usage: rlox [script]");
            return Ok(ExitCode::from(EX_USAGE));
        }
    };

    let status = match cli.script {
        Some(script) => run_file(&script)?,
        None => run_prompt()?,
    };
    Ok(ExitCode::from(status))
}

fn run_file(path: &Path) -> Result<u8, CLIError> {
    if !path.try_exists()? {
        return Err(CLIError::FileDoesNotExist(path.display().to_string()));
    }
    let source = read_to_string(path)?;
    info!("scanning {} ({} bytes)", path.display(), source.len());

    let mut diagnostics = Diagnostics::new(io::stderr());
    run(&source, &mut io::stdout().lock(), &mut diagnostics)?;
    Ok(exit_status(&diagnostics))
}

fn run_prompt() -> Result<u8, CLIError> {
    fn prompt() -> io::Result<()> {
        print!("> ");
        io::stdout().flush()
    }

    let mut diagnostics = Diagnostics::new(io::stderr());
    prompt()?;
    for entry in MultilineInput::new(io::stdin().lock().lines()) {
        // every entry gets a fresh chance
        diagnostics.reset();
        run(&entry?, &mut io::stdout(), &mut diagnostics)?;
        prompt()?;
    }
    Ok(0)
}

fn run<W: Write, E: Write>(
    source: &str,
    writer: &mut W,
    diagnostics: &mut Diagnostics<E>,
) -> io::Result<()> {
    let tokens = tokenize(source, |err| diagnostics.scanning_error(err));
    for token in tokens {
        writeln!(writer, "{token}")?;
    }
    Ok(())
}

fn exit_status<E: Write>(diagnostics: &Diagnostics<E>) -> u8 {
    if diagnostics.had_error() {
        info!("{} error(s) reported", diagnostics.error_count());
        EX_DATAERR
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use crate::diagnostics::Diagnostics;
    use crate::{exit_status, run, run_file, CLIError, Cli, EX_DATAERR};

    fn run_to_strings(source: &str) -> (String, String, u8) {
        let mut output: Vec<u8> = vec![];
        let mut diagnostics = Diagnostics::new(Vec::<u8>::new());
        run(source, &mut output, &mut diagnostics).unwrap();
        let status = exit_status(&diagnostics);
        let errors = String::from_utf8(diagnostics.writer().clone()).unwrap();
        (String::from_utf8(output).unwrap(), errors, status)
    }

    #[test]
    fn test_run_prints_tokens() {
        let (output, errors, status) = run_to_strings("var x = \"hi\";\nprint x + 1;");
        assert_eq!(
            output,
            "VAR var null\n\
             IDENTIFIER x null\n\
             EQUAL = null\n\
             STRING \"hi\" hi\n\
             SEMICOLON ; null\n\
             PRINT print null\n\
             IDENTIFIER x null\n\
             PLUS + null\n\
             NUMBER 1 1.0\n\
             SEMICOLON ; null\n\
             EOF  null\n"
        );
        assert_eq!(errors, "");
        assert_eq!(status, 0);
    }

    #[test]
    fn test_run_reports_every_error() {
        let (output, errors, status) = run_to_strings("@\n1.\n\"open");
        assert_eq!(output, "EOF  null\n");
        assert_eq!(
            errors,
            "[line 1] Error : Unexpected character.\n\
             [line 2] Error : Trailing decimal point is not supported.\n\
             [line 3] Error : Unterminated string.\n"
        );
        assert_eq!(status, EX_DATAERR);
    }

    #[test]
    fn test_missing_file() {
        let result = run_file(Path::new("this/file/does/not/exist.lox"));
        assert!(matches!(result, Err(CLIError::FileDoesNotExist(_))));
    }

    #[test]
    fn test_cli_arguments() {
        assert_eq!(Cli::try_parse_from(["rlox"]).unwrap().script, None);
        assert_eq!(
            Cli::try_parse_from(["rlox", "script.lox"]).unwrap().script,
            Some("script.lox".into())
        );
        assert!(Cli::try_parse_from(["rlox", "a.lox", "b.lox"]).is_err());
    }
}
