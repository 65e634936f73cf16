//! Cookie jar over a `document.cookie`-style header (`a=1; b=2`).
//!
//! Holds the legacy panel representation until migration deletes it.
//! Attributes (`path`, `max-age`) are not modelled; the jar only tracks
//! name/value pairs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::KeyValueStore;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<BTreeMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a cookie header. Pairs without `=` or with an empty name are skipped.
    pub fn from_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self {
            cookies: Mutex::new(cookies),
        }
    }

    /// Renders the jar back into header form, names in sorted order.
    pub fn to_header(&self) -> String {
        self.cookies()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cookies().contains_key(name)
    }

    fn cookies(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cookies().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.cookies().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.cookies().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let jar = CookieJar::from_header("sidebar_collapsed=true; theme=dark");
        assert_eq!(
            jar.get("sidebar_collapsed").unwrap(),
            Some("true".to_string())
        );
        assert_eq!(jar.get("theme").unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn test_parse_skips_malformed_pairs() {
        let jar = CookieJar::from_header(" ; novalue; =orphan;  a = 1 ;");
        assert!(!jar.contains("novalue"));
        assert_eq!(jar.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(jar.to_header(), "a=1");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let jar = CookieJar::from_header("token=abc==");
        assert_eq!(jar.get("token").unwrap(), Some("abc==".to_string()));
    }

    #[test]
    fn test_remove_and_render() {
        let jar = CookieJar::from_header("b=2; a=1");
        jar.remove("b").unwrap();
        jar.remove("missing").unwrap();
        assert_eq!(jar.to_header(), "a=1");
    }

    #[test]
    fn test_empty_header() {
        let jar = CookieJar::from_header("");
        assert_eq!(jar.to_header(), "");
    }
}
