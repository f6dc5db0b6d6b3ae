//! An interactive loop: type a program, see it run, type the next one.

use crate::interpret::Interpreter;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

/// How long a program typed into the REPL may run.
pub const REPL_TIMEOUT: Duration = Duration::from_secs(5);

/// Read programs from `input` and run each one.
///
/// Lines are collected until one ends with `.`, and the collected text is then
/// run as a single program. A program that runs longer than `timeout` is
/// stopped between two statements. Errors are printed to `output` and the
/// loop goes on. A line holding just `q` ends the session.
///
/// Numbers for `read` are taken from the lines typed after the program. Only
/// the lines holding them are used up; the next program starts after them.
pub fn repl(
    input: &mut impl BufRead,
    output: &mut impl Write,
    timeout: Duration,
) -> io::Result<()> {
    let mut line = String::new();
    let mut program = String::new();
    loop {
        let prompt = if program.is_empty() { ">   " } else { "... " };
        write!(output, "{prompt}")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break Ok(());
        }
        if program.is_empty() && line.trim() == "q" {
            break Ok(());
        }
        program.push_str(&line);
        if !line.trim_end().ends_with('.') {
            continue;
        }

        let deadline = Instant::now() + timeout;
        let result = Interpreter::new(program.as_bytes(), &mut *input, &mut *output)
            .with_cancellation(move || Instant::now() >= deadline)
            .run();
        if let Err(err) = result {
            writeln!(output, "Error: {err}")?;
        }
        program.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn session(lines: &str, timeout: Duration) -> String {
        let mut out = Vec::new();
        repl(&mut lines.as_bytes(), &mut out, timeout).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn runs_each_program() {
        let lines = indoc! {"
            write(1).
            var x;
            begin x := 2; write(x) end.
            q
            write(3).
        "};
        assert_eq!(
            session(lines, REPL_TIMEOUT),
            ">   1\n>   ... 2\n>   ",
        );
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let lines = "write(1/0).\nwrite(4).\n";
        assert_eq!(
            session(lines, REPL_TIMEOUT),
            ">   Error: [1:8] division by zero\n>   4\n>   ",
        );
    }

    #[test]
    fn read_takes_the_next_line() {
        let lines = "var n; begin read(n); write(n * 2) end.\n21\n";
        assert_eq!(session(lines, REPL_TIMEOUT), ">   42\n>   ");
    }

    #[test]
    fn programs_after_a_read_still_run() {
        let lines = indoc! {"
            var n; begin read(n); write(n * 2) end.
            21
            write(5).
            var a, b; begin read(a, b); write(a + b) end.
            1 2
            write(6).
        "};
        assert_eq!(
            session(lines, REPL_TIMEOUT),
            ">   42\n>   5\n>   3\n>   6\n>   ",
        );
    }

    #[test]
    fn runaway_programs_are_stopped() {
        let lines = "while 0 = 0 do .\nwrite(5).\n";
        let out = session(lines, Duration::from_millis(50));
        assert_eq!(out, ">   Error: [1:16] cancelled\n>   5\n>   ");
    }
}
