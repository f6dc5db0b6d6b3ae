// std imports
use std::collections::VecDeque;
use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::process::exit;
// library imports
use indoc::indoc;
use thiserror::Error;
// our imports
use pl0::prelude::*;

const USAGE: &str = indoc! {r"
    USAGE:
        pl0 <file>
        pl0 -
        pl0 repl

    Calling `pl0 <file>` runs the program in the given file, taking the numbers for `read` from
    stdin. Calling `pl0 -` reads the program itself from stdin, up to its final `.`, and `read`
    takes its numbers from whatever follows. Calling `pl0 repl`
    starts a Read-Eval-Print loop where every program ends with a `.`; type `q` to leave.

    Set PL0_LOG (e.g. `PL0_LOG=debug`) to see what the interpreter is doing.
"};

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Run(#[from] pl0::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq)]
struct MainConfig {
    command: Command,
    executable_name: String,
    help_flag: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Stdin,
    File(PathBuf),
    Repl,
    Error(Vec<String>),
}

impl MainConfig {
    pub fn new(mut args: VecDeque<String>) -> Self {
        let executable_name = args.pop_front().unwrap_or_else(|| "pl0".to_string());
        let mut help_flag = false;
        args.retain(|arg| {
            let is_help_flag = arg == "--help" || arg == "-h";
            help_flag |= is_help_flag;
            !is_help_flag
        });
        let command = match &args.iter().map(|x| x.as_str()).collect::<Vec<_>>()[..] {
            ["-"] => Command::Stdin,
            ["repl"] => Command::Repl,
            [file] => Command::File(file.into()),
            _ => Command::Error(args.iter().cloned().collect()),
        };
        Self {
            command,
            executable_name,
            help_flag,
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_env("PL0_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn run_file(path: &PathBuf) -> Result<()> {
    let file = std::fs::File::open(path)?;
    run(std::io::BufReader::new(file), stdin().lock(), stdout().lock())?;
    Ok(())
}

fn handle_error<T, E: std::fmt::Display>(res: Result<T, E>) -> T {
    match res {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error: {err}");
            exit(1);
        }
    }
}

fn main() {
    init_tracing();
    let config = MainConfig::new(std::env::args().collect());

    if config.help_flag {
        println!("{USAGE}");
        exit(0);
    }

    match config.command {
        Command::Stdin => {
            handle_error(run_stream(&mut stdin().lock(), stdout().lock()).map_err(Error::from));
        }
        Command::File(path_buf) => {
            if let Err(err) = run_file(&path_buf) {
                if let Error::Io(_) = err {
                    let path = path_buf.display();
                    eprintln!("Error: could not read the file '{path}'.");
                }
                handle_error::<(), _>(Err(err));
            }
        }
        Command::Repl => {
            handle_error(
                repl(&mut stdin().lock(), &mut stdout(), REPL_TIMEOUT).map_err(Error::from),
            );
        }
        Command::Error(items) => {
            let items = items.join("\n");
            eprintln!("Error: could not understand the command");
            eprintln!("Alien arguments: {items}");
            eprintln!("{USAGE}");
            eprintln!("(run `{} --help` for this message)", config.executable_name);
            exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> MainConfig {
        MainConfig::new(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn commands() {
        assert_eq!(config(&["pl0", "-"]).command, Command::Stdin);
        assert_eq!(config(&["pl0", "repl"]).command, Command::Repl);
        assert_eq!(
            config(&["pl0", "prog.pl0"]).command,
            Command::File("prog.pl0".into())
        );
        assert_eq!(
            config(&["pl0", "a", "b"]).command,
            Command::Error(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn help_flag_anywhere() {
        let c = config(&["pl0", "--help", "prog.pl0"]);
        assert!(c.help_flag);
        assert_eq!(c.command, Command::File("prog.pl0".into()));
        assert!(!config(&["pl0", "prog.pl0"]).help_flag);
    }
}
