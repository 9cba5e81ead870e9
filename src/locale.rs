//! Locales supported by an application.

use crate::core::{Change, DaoError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;

lazy_static::lazy_static! {
    static ref LOCALE_PATTERN: Regex = Regex::new(r"^([a-z]{2,3})(?:_([A-Z]{2}))?$").unwrap();
}

/// Language with an optional country, written `ll` or `ll_CC`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    pub fn new(language: &str, country: Option<&str>) -> Result<Self> {
        match country {
            Some(country) => format!("{}_{}", language, country).parse(),
            None => language.parse(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl FromStr for Locale {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self> {
        let captures = LOCALE_PATTERN
            .captures(s)
            .ok_or_else(|| DaoError::IllegalArgument(format!("Invalid locale '{}'", s)))?;
        Ok(Self {
            language: captures[1].to_string(),
            country: captures.get(2).map(|m| m.as_str().to_string()),
        })
    }
}

impl TryFrom<String> for Locale {
    type Error = DaoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => f.write_str(&self.language),
        }
    }
}

#[derive(Debug, Default)]
struct LocaleState {
    supported: BTreeSet<Locale>,
    default_locale: Option<Locale>,
}

/// Registry of the supported locales and the default one.
#[derive(Debug, Default)]
pub struct LocaleManager {
    state: RwLock<LocaleState>,
}

impl LocaleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_locale(&self, locale: Locale) -> Result<Change> {
        Ok(Change::from_bool(self.state.write()?.supported.insert(locale)))
    }

    pub fn supported_locales(&self) -> Result<BTreeSet<Locale>> {
        Ok(self.state.read()?.supported.clone())
    }

    pub fn is_supported(&self, locale: &Locale) -> Result<bool> {
        Ok(self.state.read()?.supported.contains(locale))
    }

    pub fn default_locale(&self) -> Result<Option<Locale>> {
        Ok(self.state.read()?.default_locale.clone())
    }

    /// The locale must be registered first.
    pub fn set_default_locale(&self, locale: Locale) -> Result<Change> {
        let mut state = self.state.write()?;
        if !state.supported.contains(&locale) {
            return Err(DaoError::IllegalArgument(format!(
                "Locale '{}' is not supported",
                locale
            )));
        }
        if state.default_locale.as_ref() == Some(&locale) {
            return Ok(Change::Unchanged);
        }
        state.default_locale = Some(locale);
        Ok(Change::Changed)
    }
}
