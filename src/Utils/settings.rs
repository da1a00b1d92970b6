//! Run-time settings of the calculus layer, optionally read from a task document:
//! ```text
//! settings
//! loglevel: info
//! simplify_results: true
//! max_expand_power: 8
//! ```
use crate::Utils::task_parser::{Value, parse_document};
use crate::error::CalcError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_simplify::MAX_EXPAND_POWER;

#[derive(Debug, Clone, PartialEq)]
pub struct CalcSettings {
    /// "off", "none", "debug", "info", "warn" or "error"; `None` leaves logging untouched
    pub loglevel: Option<String>,
    /// simplify every symbolic result returned to the caller
    pub simplify_results: bool,
    /// largest integer power of a sum that `expand` multiplies out
    pub max_expand_power: u32,
}

impl Default for CalcSettings {
    fn default() -> Self {
        CalcSettings {
            loglevel: None,
            simplify_results: true,
            max_expand_power: MAX_EXPAND_POWER,
        }
    }
}

const LOGLEVELS: [&str; 6] = ["off", "none", "debug", "info", "warn", "error"];

fn single_value<'a>(key: &str, values: &'a [Value]) -> Result<&'a Value, CalcError> {
    match values {
        [value] => Ok(value),
        _ => Err(CalcError::Settings(format!(
            "key '{}' expects exactly one value, got {}",
            key,
            values.len()
        ))),
    }
}

impl CalcSettings {
    /// Reads settings from every section of a task document; keys missing from the document keep
    /// their defaults, unknown keys are an error.
    pub fn from_document(document: &str) -> Result<CalcSettings, CalcError> {
        let parsed = parse_document(document)?;
        let mut settings = CalcSettings::default();
        for section in parsed.values() {
            for (key, values) in section {
                let value = single_value(key, values)?;
                match key.as_str() {
                    "loglevel" => {
                        let level = value
                            .as_string()
                            .filter(|level| LOGLEVELS.contains(&level.as_str()))
                            .ok_or_else(|| {
                                CalcError::Settings(format!("unknown loglevel '{}'", value))
                            })?;
                        settings.loglevel = Some(level.clone());
                    }
                    "simplify_results" => {
                        settings.simplify_results = value.as_boolean().ok_or_else(|| {
                            CalcError::Settings(format!("simplify_results must be true or false, got '{}'", value))
                        })?;
                    }
                    "max_expand_power" => {
                        settings.max_expand_power = value
                            .as_integer()
                            .and_then(|p| u32::try_from(p).ok())
                            .ok_or_else(|| {
                                CalcError::Settings(format!(
                                    "max_expand_power must be a non-negative integer, got '{}'",
                                    value
                                ))
                            })?;
                    }
                    other => {
                        return Err(CalcError::Settings(format!("unknown key '{}'", other)));
                    }
                }
            }
        }
        Ok(settings)
    }

    /// Applies the post-processing these settings ask for to a symbolic result.
    pub fn finish(&self, expr: Expr) -> Expr {
        if self.simplify_results { expr.simplify() } else { expr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CalcSettings::default();
        assert_eq!(settings.loglevel, None);
        assert!(settings.simplify_results);
        assert_eq!(settings.max_expand_power, 8);
    }

    #[test]
    fn test_from_document() {
        let doc = "
        % run settings
        settings
        loglevel: warn
        simplify_results: false
        max_expand_power: 3
        ";
        let settings = CalcSettings::from_document(doc).unwrap();
        assert_eq!(settings.loglevel.as_deref(), Some("warn"));
        assert!(!settings.simplify_results);
        assert_eq!(settings.max_expand_power, 3);

        let raw = Expr::parse_expression("x + 0").unwrap();
        assert_eq!(settings.finish(raw.clone()), raw);
    }

    #[test]
    fn test_from_document_errors() {
        let unknown = CalcSettings::from_document("settings tolerance: 1e-6");
        assert!(matches!(unknown, Err(CalcError::Settings(_))));
        let bad_level = CalcSettings::from_document("settings loglevel: loud");
        assert!(matches!(bad_level, Err(CalcError::Settings(_))));
        let negative = CalcSettings::from_document("settings max_expand_power: -2");
        assert!(matches!(negative, Err(CalcError::Settings(_))));
        let two_values = CalcSettings::from_document("settings simplify_results: true, false");
        assert!(matches!(two_values, Err(CalcError::Settings(_))));
    }
}
