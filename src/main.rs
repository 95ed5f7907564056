use awtools::cli::{parse_args, run_command};
use awtools::config::{load_settings, Settings};
use awtools::logging::{set_log_file, set_log_level, Level, Logger};
use awtools::text::error_chain_to_string;
use std::path::PathBuf;
use std::process;

const LOG: Logger = Logger::new(module_path!());

fn main() {
    let options = parse_args();

    let settings = match &options.settings_file {
        Some(path) => match load_settings(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error loading settings file {}: {}", path, e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };

    // Command line wins over the settings file
    let log_file = options
        .log_file
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| settings.log_file.clone());
    if let Some(log_file) = log_file {
        set_log_file(log_file);
    }
    if options.debug || settings.debug {
        set_log_level(Level::Debug);
    }

    let _ = LOG.debug(&format!("Running {:?}", options.command));

    match run_command(&options.command) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", error_chain_to_string(&e));
            process::exit(1);
        }
    }
}
