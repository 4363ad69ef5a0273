//! Property tests for cookie jar merging and link sets

use std::collections::HashMap;

use jobharvest::crawler::{CookieJar, LinkSet};
use proptest::prelude::*;

fn cookie_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,7}"
}

fn cookie_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{0,12}"
}

proptest! {
    /// The last Set-Cookie for a name wins; names never set keep their value
    #[test]
    fn merge_is_last_write_wins(
        initial in proptest::collection::vec((cookie_name(), cookie_value()), 0..6),
        updates in proptest::collection::vec((cookie_name(), cookie_value()), 0..12),
    ) {
        let mut jar = CookieJar::new();
        let mut expected: HashMap<String, String> = HashMap::new();
        for (name, value) in &initial {
            jar.set(name.clone(), value.clone());
            expected.insert(name.clone(), value.clone());
        }

        let headers: Vec<String> = updates
            .iter()
            .map(|(name, value)| format!("{name}={value}; Path=/; HttpOnly"))
            .collect();
        for (name, value) in &updates {
            expected.insert(name.clone(), value.clone());
        }

        let merged = jar.merge(&headers);

        prop_assert_eq!(merged.len(), expected.len());
        for (name, value) in &expected {
            prop_assert_eq!(merged.get(name), Some(value.as_str()));
        }
    }

    /// Merging the same headers twice changes nothing
    #[test]
    fn merge_is_idempotent(
        updates in proptest::collection::vec((cookie_name(), cookie_value()), 0..8),
    ) {
        let headers: Vec<String> = updates
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();

        let once = CookieJar::new().merge(&headers);
        let twice = once.clone().merge(&headers);
        prop_assert_eq!(once, twice);
    }

    /// The cookie header lists each name exactly once
    #[test]
    fn header_has_unique_names(
        updates in proptest::collection::vec((cookie_name(), cookie_value()), 1..8),
    ) {
        let headers: Vec<String> = updates
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        let jar = CookieJar::new().merge(&headers);

        let header = jar.header_value().unwrap();
        let mut names: Vec<&str> = header
            .split("; ")
            .filter_map(|pair| pair.split('=').next())
            .collect();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), count);
        prop_assert_eq!(count, jar.len());
    }

    /// A link set never holds duplicates regardless of insertion order
    #[test]
    fn link_set_deduplicates(
        paths in proptest::collection::vec("[a-z]{1,4}", 0..20),
    ) {
        let mut set = LinkSet::new();
        let mut inserted = 0;
        for p in &paths {
            if set.insert(format!("https://jobs.example.com/job/{p}/")) {
                inserted += 1;
            }
        }

        let mut unique = paths.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(set.len(), unique.len());
        prop_assert_eq!(inserted, unique.len());
    }
}
