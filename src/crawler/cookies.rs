//! Session cookie jar for one crawl
//!
//! The jar is a plain value: a crawl takes it in, merges `Set-Cookie`
//! headers into it and hands back the updated jar. It is never shared
//! between crawls.

use std::fmt;

/// Ordered `name -> value` cookie mapping with last-write-wins merges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `cookie` request header (`a=b; c=d`)
    pub fn parse_header(header: &str) -> Self {
        let mut jar = Self::new();
        for part in header.split(';') {
            if let Some((name, value)) = split_pair(part) {
                jar.set(name, value);
            }
        }
        jar
    }

    /// Insert or overwrite a cookie, keeping its original position
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Merge raw `Set-Cookie` header values, returning the updated jar
    ///
    /// Only the `name=value` pair before the first `;` is kept; attributes
    /// such as `Path` or `HttpOnly` are ignored. Values without a name are
    /// skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobharvest::crawler::cookies::CookieJar;
    ///
    /// let jar = CookieJar::parse_header("a=1; b=2").merge(["a=9; Path=/", "c=3"]);
    /// assert_eq!(jar.get("a"), Some("9"));
    /// assert_eq!(jar.get("b"), Some("2"));
    /// assert_eq!(jar.get("c"), Some("3"));
    /// ```
    #[must_use]
    pub fn merge<I, S>(mut self, set_cookies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in set_cookies {
            let pair = raw.as_ref().split(';').next().unwrap_or_default();
            if let Some((name, value)) = split_pair(pair) {
                self.set(name, value);
            }
        }
        self
    }

    /// Value for the `cookie` request header, `None` when empty
    pub fn header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let pair = pair.trim();
    let eq = pair.find('=')?;
    if eq == 0 {
        return None;
    }
    Some((&pair[..eq], &pair[eq + 1..]))
}
