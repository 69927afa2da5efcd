//! netprofile-dump - inspect a connection-profile keyfile.
//!
//! Reads a keyfile, reports every codec warning, prints the decoded
//! settings and optionally re-emits the canonical serialization.

use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use netprofile::keyfile::{self, ReadOptions, Veto, WarnSeverity, Warning};
use netprofile::store::KeyFile;

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (write_back, files): (Vec<&String>, Vec<&String>) =
        args.iter().partition(|a| a.as_str() == "--write");
    let Some(path) = files.first() else {
        eprintln!("usage: netprofile-dump [--write] <keyfile>");
        process::exit(2);
    };

    if let Err(message) = run(PathBuf::from(path.as_str()), !write_back.is_empty()) {
        eprintln!("{message}");
        process::exit(1);
    }
}

fn run(path: PathBuf, write_back: bool) -> Result<(), String> {
    let text =
        std::fs::read_to_string(&path).map_err(|e| format!("cannot read '{}': {e}", path.display()))?;
    let store = KeyFile::parse(&text).map_err(|e| format!("cannot parse '{}': {e}", path.display()))?;

    let options = ReadOptions {
        keyfile_name: Some(path),
        base_dir: None,
    };
    let mut report = |warning: &Warning| {
        let severity = match warning.severity {
            WarnSeverity::Info => "info",
            WarnSeverity::InfoMissingFile => "missing-file",
            WarnSeverity::Warn => "warn",
        };
        let group = warning.group.as_deref().unwrap_or("-");
        eprintln!("{severity}: [{group}] {}", warning.message);
        Veto::Continue
    };

    let connection = keyfile::read_connection(&store, &options, Some(&mut report))
        .map_err(|e| e.to_string())?;

    for setting in connection.settings() {
        println!("[{}]", setting.name());
        for descriptor in setting.schema().properties {
            if !setting.is_default(descriptor.name) {
                if let Some(value) = setting.get(descriptor.name) {
                    println!("  {} = {value:?}", descriptor.name);
                }
            }
        }
    }

    if write_back {
        let emitted = keyfile::write_connection(&connection, None).map_err(|e| e.to_string())?;
        println!("{}", emitted.serialize());
    }

    Ok(())
}
