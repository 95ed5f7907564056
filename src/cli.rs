use crate::finder::find_files_by_path;
use crate::fs_utils::create_file_path;
use crate::paths::{count_dir_level, get_file_name, get_parent, normalize_path, path_to_root, path_to_root_of};
use std::env;
use std::io;
use std::path::Path;
use std::process;

/// Prints usage instructions for the program.
pub fn print_usage() {
    println!(
        "Usage: {} [-h] [-v] [-D] [-l logfile] [-s settings.json] command args...\n\
         \n\
         Commands:\n\
         \x20 normalize <path>          canonical /-separated form\n\
         \x20 level <path>              directory levels in front of the file name\n\
         \x20 root <path|level>         relative path back to the root\n\
         \x20 parent <path>             directory part\n\
         \x20 name <path>               file name part\n\
         \x20 find <base> <rel/file>    files of that name on the way down\n\
         \x20 mkpath <base> <rel/file>  create the directories for a file",
        crate::PROGRAM_NAME
    );
}

/// A subcommand with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Normalize(String),
    Level(String),
    Root(String),
    Parent(String),
    Name(String),
    Find { base: String, relative: String },
    MkPath { base: String, relative: String },
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub log_file: Option<String>,
    pub settings_file: Option<String>,
    pub debug: bool,
    pub command: Command,
}

/// What the argument parser decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Run(CliOptions),
    Help,
    Version,
}

/// Parses the process arguments
///
/// Prints usage and exits on `-h`, `-v` or invalid arguments.
pub fn parse_args() -> CliOptions {
    match parse_args_from(env::args().skip(1)) {
        Ok(ParseOutcome::Run(options)) => options,
        Ok(ParseOutcome::Help) => {
            print_usage();
            process::exit(0);
        }
        Ok(ParseOutcome::Version) => {
            println!("{} version {}", crate::PROGRAM_NAME, crate::PROGRAM_VERSION);
            process::exit(0);
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(1);
        }
    }
}

/// Parses arguments without the program name
///
/// # Errors
/// A message describing the first invalid or missing argument.
pub fn parse_args_from<I>(args: I) -> Result<ParseOutcome, String>
where
    I: IntoIterator<Item = String>,
{
    let mut log_file = None;
    let mut settings_file = None;
    let mut debug = false;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" => return Ok(ParseOutcome::Help),
            "-v" => return Ok(ParseOutcome::Version),
            "-D" => debug = true,
            "-l" => {
                log_file = Some(args.next().ok_or("Missing log file argument")?);
            }
            "-s" => {
                settings_file = Some(args.next().ok_or("Missing settings file argument")?);
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let name = positional.next().ok_or("Missing command")?;
    let mut next = |what: &str| {
        positional
            .next()
            .ok_or_else(|| format!("Missing {} argument for '{}'", what, name))
    };

    let command = match name.as_str() {
        "normalize" => Command::Normalize(next("path")?),
        "level" => Command::Level(next("path")?),
        "root" => Command::Root(next("path or level")?),
        "parent" => Command::Parent(next("path")?),
        "name" => Command::Name(next("path")?),
        "find" => Command::Find {
            base: next("base")?,
            relative: next("relative file")?,
        },
        "mkpath" => Command::MkPath {
            base: next("base")?,
            relative: next("relative file")?,
        },
        other => return Err(format!("Unknown command: {}", other)),
    };

    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra));
    }

    Ok(ParseOutcome::Run(CliOptions {
        log_file,
        settings_file,
        debug,
        command,
    }))
}

/// Executes `command` and returns the lines to print
pub fn run_command(command: &Command) -> io::Result<Vec<String>> {
    let lines = match command {
        Command::Normalize(path) => vec![normalize_path(path)],
        Command::Level(path) => vec![count_dir_level(path).to_string()],
        Command::Root(arg) => match arg.parse::<usize>() {
            Ok(level) => vec![path_to_root(level)],
            Err(_) => vec![path_to_root_of(arg)],
        },
        Command::Parent(path) => vec![get_parent(path)],
        Command::Name(path) => vec![get_file_name(path)],
        Command::Find { base, relative } => find_files_by_path(Path::new(base), relative)
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        Command::MkPath { base, relative } => {
            create_file_path(base, relative)?;
            Vec::new()
        }
    };
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_with_options() {
        let outcome = parse_args_from(args(&["-D", "-l", "/tmp/aw.log", "-s", "s.json", "level", "a/b/c.txt"])).unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Run(CliOptions {
                log_file: Some("/tmp/aw.log".to_string()),
                settings_file: Some("s.json".to_string()),
                debug: true,
                command: Command::Level("a/b/c.txt".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_args_two_argument_commands() {
        match parse_args_from(args(&["find", "/base", "x/y.txt"])).unwrap() {
            ParseOutcome::Run(options) => assert_eq!(
                options.command,
                Command::Find {
                    base: "/base".to_string(),
                    relative: "x/y.txt".to_string()
                }
            ),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_parse_args_help_and_version() {
        assert_eq!(parse_args_from(args(&["-h"])).unwrap(), ParseOutcome::Help);
        assert_eq!(parse_args_from(args(&["-v", "normalize"])).unwrap(), ParseOutcome::Version);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args_from(args(&[])).is_err());
        assert!(parse_args_from(args(&["-l"])).is_err());
        assert!(parse_args_from(args(&["bogus", "x"])).is_err());
        assert!(parse_args_from(args(&["find", "/base"])).is_err());
        assert!(parse_args_from(args(&["name", "a", "b"])).is_err());
    }

    #[test]
    fn test_run_path_commands() {
        assert_eq!(run_command(&Command::Normalize("C:\\a\\b\\".into())).unwrap(), vec!["/a/b"]);
        assert_eq!(run_command(&Command::Level("tw/te/winkler.txt".into())).unwrap(), vec!["2"]);
        assert_eq!(run_command(&Command::Root("2".into())).unwrap(), vec!["./../../"]);
        assert_eq!(run_command(&Command::Root("a/b.txt".into())).unwrap(), vec!["./../"]);
        assert_eq!(run_command(&Command::Parent("tmp/test.txt".into())).unwrap(), vec!["/tmp"]);
        assert_eq!(run_command(&Command::Name("tmp/test.txt".into())).unwrap(), vec!["test.txt"]);
    }

    #[test]
    fn test_run_mkpath_and_find() {
        let dir = tempdir().unwrap();
        let base = dir.path().to_str().unwrap().to_string();

        let made = run_command(&Command::MkPath {
            base: base.clone(),
            relative: "a/b/hit.txt".into(),
        })
        .unwrap();
        assert!(made.is_empty());
        fs::write(dir.path().join("a/b/hit.txt"), "").unwrap();

        let found = run_command(&Command::Find {
            base,
            relative: "a/b/hit.txt".into(),
        })
        .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("hit.txt"));
    }
}
