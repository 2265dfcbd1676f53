use std::fs::create_dir_all;
use std::path::PathBuf;

use backtrace::Backtrace;
use failure::{format_err, Error, ResultExt};
use log::{Level, LevelFilter};

/// `~/.cmdflags`.
pub fn cmdflags_dir() -> Result<PathBuf, Error> {
    let dir = dirs::home_dir()
        .ok_or_else(|| format_err!("where's your home dir?"))?
        .join(".cmdflags");

    create_dir_all(&dir).with_context(|_| format!("failed to create {}", dir.display()))?;
    Ok(dir)
}

pub fn log_file_path(name: &str) -> Result<PathBuf, Error> {
    let log_dir = cmdflags_dir()?.join("log");
    create_dir_all(&log_dir).with_context(|_| format!("failed to create {}", log_dir.display()))?;
    Ok(log_dir.join(&format!("{}.log", name)))
}

pub fn install_logger(name: &str, level: Option<LevelFilter>) -> Result<(), Error> {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };

    let path = log_file_path(name)?;
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}{:<5} {}:{}\x1b[0m {}",
                level_color(record.level()),
                record.level(),
                record.file().unwrap_or_else(|| record.target()),
                record.line().unwrap_or(0),
                message
            ))
        })
        .level(level.unwrap_or(default_level))
        .chain(fern::log_file(&path).with_context(|_| format!("failed to open {}", path.display()))?)
        .apply()
        .map_err(|err| format_err!("failed to initialize the logger: {}", err))?;

    std::panic::set_hook(Box::new(|info| {
        error!("{}", info);
        log_backtrace(Backtrace::new());
    }));

    Ok(())
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[1;31m",
        Level::Warn => "\x1b[1;33m",
        Level::Info => "\x1b[34m",
        _ => "\x1b[2m",
    }
}

/// Whether a frame lies in the toolchain or a dependency rather than in
/// this crate.
fn is_foreign_frame(path: &str) -> bool {
    ["/.rustup/", "/.cargo/registry/", "/rustc/"]
        .iter()
        .any(|marker| path.contains(marker))
}

/// Logs the frames of `backtrace` that belong to this crate, innermost
/// first.
fn log_backtrace(backtrace: Backtrace) {
    let frames = backtrace
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .filter_map(|symbol| {
            let path = symbol.filename()?.to_string_lossy().into_owned();
            if is_foreign_frame(&path) {
                return None;
            }
            let function = symbol
                .name()
                .map(|name| name.to_string())
                .unwrap_or_else(|| "<unknown>".to_owned());
            Some((function, path, symbol.lineno().unwrap_or(0)))
        });

    for (depth, (function, path, line)) in frames.enumerate() {
        error!("  {:>2}: {} at {}:{}", depth, function, path, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_frames() {
        assert!(is_foreign_frame("/rustc/abc123/library/core/src/panicking.rs"));
        assert!(is_foreign_frame(
            "/home/me/.cargo/registry/src/index/fern-0.6.2/src/builders.rs"
        ));
        assert!(!is_foreign_frame("/home/me/cmdflags/src/result.rs"));
    }
}
