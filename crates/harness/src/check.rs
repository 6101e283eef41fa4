//! Assertion library
//!
//! Pure comparisons between observed values and the expectations carried by a
//! test-case record. Nothing here touches the browser or the database; the
//! runner gathers observations and feeds them in. Failures accumulate rather
//! than short-circuit, so one run surfaces every mismatch in a scenario.

use crate::error::{Error, Result};
use crate::store::Digest;

/// Accumulating verifier for one scenario
#[derive(Debug, Default)]
pub struct Verifier {
    failures: Vec<String>,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, what: &str, expected: impl std::fmt::Display, actual: impl std::fmt::Display) {
        self.failures
            .push(format!("{}: expected {}, got {}", what, expected, actual));
    }

    /// The needle must occur in the haystack (rendered page, banner region)
    pub fn text_present(&mut self, region: &str, haystack: &str, needle: &str) {
        if !haystack.contains(needle) {
            self.failures.push(format!(
                "{}: expected text {:?} not present",
                region, needle
            ));
        }
    }

    /// The needle must not occur in the haystack
    pub fn text_absent(&mut self, region: &str, haystack: &str, needle: &str) {
        if haystack.contains(needle) {
            self.failures.push(format!(
                "{}: unexpected text {:?} present",
                region, needle
            ));
        }
    }

    pub fn visible(&mut self, locator: &str, observed: bool) {
        if !observed {
            self.fail(locator, "visible", "not visible");
        }
    }

    pub fn not_visible(&mut self, locator: &str, observed: bool) {
        if observed {
            self.fail(locator, "not visible", "visible");
        }
    }

    /// Attribute value comparison; `None` means the attribute must be absent
    pub fn attribute(
        &mut self,
        locator: &str,
        name: &str,
        expected: Option<&str>,
        actual: Option<&str>,
    ) {
        if expected != actual {
            self.fail(
                &format!("{}@{}", locator, name),
                format_opt(expected),
                format_opt(actual),
            );
        }
    }

    /// Exact value comparison (form round-trip checks, byte-for-byte)
    pub fn value(&mut self, what: &str, expected: &str, actual: &str) {
        if expected != actual {
            self.fail(what, format!("{:?}", expected), format!("{:?}", actual));
        }
    }

    /// Selected dropdown option label
    pub fn selected(&mut self, locator: &str, expected: &str, actual: &str) {
        if expected != actual {
            self.fail(
                &format!("{} selection", locator),
                format!("{:?}", expected),
                format!("{:?}", actual),
            );
        }
    }

    /// Backing-store row count
    pub fn row_count(&mut self, query: &str, expected: i64, actual: i64) {
        if expected != actual {
            self.fail(&format!("row count for {}", query), expected, actual);
        }
    }

    /// Byte equality of two table-content digests (the idempotence law)
    pub fn hash_unchanged(&mut self, table: &str, before: &Digest, after: &Digest) {
        if before != after {
            self.fail(
                &format!("{} content hash", table),
                before.as_str(),
                after.as_str(),
            );
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Fold accumulated mismatches into one `AssertionFailed`
    pub fn finish(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(Error::AssertionFailed(self.failures.join("\n")))
        }
    }
}

fn format_opt(v: Option<&str>) -> String {
    match v {
        Some(s) => format!("{:?}", s),
        None => "<absent>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_verifier_finishes_ok() {
        let mut v = Verifier::new();
        v.text_present("page", "Discovery rule created", "created");
        v.row_count("items", 1, 1);
        assert!(v.is_clean());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn failures_accumulate_instead_of_short_circuiting() {
        let mut v = Verifier::new();
        v.text_present("banner", "Cannot add discovery rule", "no such text");
        v.row_count("items", 1, 0);
        v.value("name", "discoveryRuleNo1", "discoveryRuleNo2");
        assert_eq!(v.failure_count(), 3);

        let err = v.finish().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no such text"));
        assert!(msg.contains("row count"));
        assert!(msg.contains("discoveryRuleNo2"));
    }

    #[test]
    fn hash_guard_detects_drift() {
        let before = Digest::from_raw("aa".into());
        let same = Digest::from_raw("aa".into());
        let changed = Digest::from_raw("bb".into());

        let mut v = Verifier::new();
        v.hash_unchanged("items", &before, &same);
        assert!(v.is_clean());

        v.hash_unchanged("items", &before, &changed);
        assert!(!v.is_clean());
    }

    #[test]
    fn attribute_comparison_reports_absence() {
        let mut v = Verifier::new();
        v.attribute("id=check_now", "disabled", Some("true"), None);
        let msg = v.finish().unwrap_err().to_string();
        assert!(msg.contains("<absent>"));
    }
}
