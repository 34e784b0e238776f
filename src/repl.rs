use std::io::{self, BufRead, Lines};

/// Handling multi-line input in the REPL.
/// Each line is an entry of its own, unless it leaves a string literal open: strings may span
/// lines, so we keep reading until the quote is closed.
/// An empty line gives up and sends what we have (the scanner will report the unterminated string).
pub struct MultilineInput<T: BufRead> {
    lines: Lines<T>,
}

impl<T: BufRead> MultilineInput<T> {
    pub fn new(lines: Lines<T>) -> MultilineInput<T> {
        MultilineInput { lines }
    }
}

impl<T: BufRead> Iterator for MultilineInput<T> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut current_input = String::new();
        let mut lines_read = 0;
        loop {
            let line = match self.lines.next() {
                // stdin closed, run whatever was typed so far (like python on CTRL+D).
                None if lines_read > 0 => return Some(Ok(current_input)),
                None => return None,
                Some(Err(err)) => return Some(Err(err)),
                Some(Ok(line)) => line,
            };
            if lines_read > 0 {
                current_input.push('\n');
            }
            current_input += &line;
            lines_read += 1;

            if line.is_empty() || !has_open_string(&current_input) {
                return Some(Ok(current_input));
            }
        }
    }
}

/// Whether `input` ends inside a string literal. Quotes in `//` comments don't count.
fn has_open_string(input: &str) -> bool {
    let mut in_string = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_string = !in_string,
            '/' if !in_string && chars.peek() == Some(&'/') => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            _ => {}
        }
    }
    in_string
}
