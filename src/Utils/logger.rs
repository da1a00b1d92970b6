//! terminal logging setup and pretty-printed reports
use crate::calculus::function::Function;
use crate::error::CalcError;
use log::info;
use simplelog::*;
use tabled::{builder::Builder, settings::Style};

/// Maps a loglevel string onto a filter; "off" and "none" silence the logger
pub fn level_filter(level: &str) -> Result<LevelFilter, CalcError> {
    match level {
        "off" | "none" => Ok(LevelFilter::Off),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        other => Err(CalcError::Settings(format!(
            "loglevel must be off, none, debug, info, warn or error, got '{}'",
            other
        ))),
    }
}

/// Starts the terminal logger. `None` means "info". A logger that is already installed is kept
/// and this call only reports the requested level.
pub fn init_logger(loglevel: Option<&str>) -> Result<LevelFilter, CalcError> {
    let log_option = match loglevel {
        Some(level) => level_filter(level)?,
        None => LevelFilter::Info,
    };
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    match logger_instance {
        Ok(()) => info!("logger started with loglevel: {}", log_option),
        Err(_) => log::debug!("logger already installed"),
    }
    Ok(log_option)
}

/// Table of the snapshots recorded by `integrate`/`transform`, oldest first, with the current
/// state in the last row.
pub fn history_table(function: &Function) -> String {
    let mut builder = Builder::default();
    builder.push_record(["step", "expression"]);
    for (i, snapshot) in function.history().iter().enumerate() {
        builder.push_record([i.to_string(), snapshot.to_string()]);
    }
    builder.push_record(["current".to_string(), function.state().to_string()]);
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculus::region::Region;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter("none").unwrap(), LevelFilter::Off);
        assert_eq!(level_filter("debug").unwrap(), LevelFilter::Debug);
        assert!(level_filter("verbose").is_err());
        assert_eq!(init_logger(Some("warn")).unwrap(), LevelFilter::Warn);
    }

    #[test]
    fn test_history_table() {
        let f = Function::from_str("x*y", &["x", "y"]).unwrap();
        let region = Region::from_pairs(&[(0.0, 1.0)]);
        let g = f.integrate(&["x"], Some(&region)).unwrap();
        let table = history_table(&g);
        assert!(table.contains("step"));
        assert!(table.contains("x*y"));
        assert!(table.contains("current"));
        assert_eq!(table.lines().filter(|l| l.contains("current")).count(), 1);
    }
}
