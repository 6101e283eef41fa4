//! Typed test-case records and the data-provider registry
//!
//! Each record is a fully materialized, immutable description of one scenario
//! row: the form fields to set (unset fields stay at their UI defaults), the
//! tagged expected outcome, and the post-condition flags. Records are
//! validated when a provider is registered; a malformed record is an author
//! error and fails the registration, never a browser run.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A value applied to one form control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    /// Type into the field, appending
    Text(String),
    /// Clear the field first, then type
    Overwrite(String),
    /// Select a dropdown option by its visible label
    Option(String),
    /// Set a checkbox state
    Flag(bool),
    /// Ordered sub-rows for repeatable sections (flexible intervals,
    /// filter conditions); indices auto-increment as rows are added
    Rows(Vec<SubRow>),
}

/// One entry in a repeatable form section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubRow {
    /// Column name → typed value for this row
    pub values: BTreeMap<String, String>,
    /// Undo the row immediately after adding it ("add then remove" as a
    /// single combined scenario)
    pub remove: bool,
}

impl SubRow {
    pub fn new(values: &[(&str, &str)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            remove: false,
        }
    }

    pub fn removed(values: &[(&str, &str)]) -> Self {
        Self {
            remove: true,
            ..Self::new(values)
        }
    }
}

/// The tagged expected outcome of a scenario row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// Submission succeeds; the success banner must carry this message
    Good { message: String },
    /// Submission fails; the failure banner carries `header` and every
    /// string in `details` must appear in the error region
    Bad {
        header: String,
        details: Vec<String>,
    },
}

impl Outcome {
    pub fn is_good(&self) -> bool {
        matches!(self, Outcome::Good { .. })
    }
}

/// Post-condition flags read by the scenario runner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostChecks {
    /// Reopen the entity and assert field values round-trip
    pub form_check: bool,
    /// Assert exactly one backing row exists with a matching projection
    pub db_check: bool,
    /// Follow up with a delete and assert the row is gone
    pub remove: bool,
    /// List link text to reopen by, when it differs from the submitted name
    pub db_name: Option<String>,
}

/// One immutable scenario row
#[derive(Debug, Clone, Serialize)]
pub struct TestCase {
    /// Short label used in per-row reporting
    pub label: String,
    /// Field name → value, applied in declaration order
    pub fields: Vec<(String, FieldValue)>,
    pub outcome: Outcome,
    pub checks: PostChecks,
}

impl TestCase {
    pub fn builder(label: impl Into<String>) -> TestCaseBuilder {
        TestCaseBuilder {
            label: label.into(),
            fields: Vec::new(),
            outcome: None,
            checks: PostChecks::default(),
        }
    }

    /// Value of a plain text field, when set
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(n, v)| {
            if n != name {
                return None;
            }
            match v {
                FieldValue::Text(s) | FieldValue::Overwrite(s) => Some(s.as_str()),
                _ => None,
            }
        })
    }

    /// Label of a dropdown field, when set
    pub fn option_field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(n, v)| match v {
            FieldValue::Option(s) if n == name => Some(s.as_str()),
            _ => None,
        })
    }
}

/// Validating builder for `TestCase`
pub struct TestCaseBuilder {
    label: String,
    fields: Vec<(String, FieldValue)>,
    outcome: Option<Outcome>,
    checks: PostChecks,
}

impl TestCaseBuilder {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields
            .push((name.to_string(), FieldValue::Text(value.to_string())));
        self
    }

    pub fn overwrite(mut self, name: &str, value: &str) -> Self {
        self.fields
            .push((name.to_string(), FieldValue::Overwrite(value.to_string())));
        self
    }

    pub fn option(mut self, name: &str, label: &str) -> Self {
        self.fields
            .push((name.to_string(), FieldValue::Option(label.to_string())));
        self
    }

    pub fn flag(mut self, name: &str, value: bool) -> Self {
        self.fields
            .push((name.to_string(), FieldValue::Flag(value)));
        self
    }

    pub fn rows(mut self, name: &str, rows: Vec<SubRow>) -> Self {
        self.fields.push((name.to_string(), FieldValue::Rows(rows)));
        self
    }

    pub fn good(mut self, message: &str) -> Self {
        self.outcome = Some(Outcome::Good {
            message: message.to_string(),
        });
        self
    }

    pub fn bad(mut self, header: &str, details: &[&str]) -> Self {
        self.outcome = Some(Outcome::Bad {
            header: header.to_string(),
            details: details.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn form_check(mut self) -> Self {
        self.checks.form_check = true;
        self
    }

    pub fn db_check(mut self) -> Self {
        self.checks.db_check = true;
        self
    }

    pub fn remove(mut self) -> Self {
        self.checks.remove = true;
        self
    }

    pub fn db_name(mut self, name: &str) -> Self {
        self.checks.db_name = Some(name.to_string());
        self
    }

    /// Validate and freeze the record. Fails fast on author errors.
    pub fn build(self) -> Result<TestCase> {
        let outcome = self.outcome.ok_or_else(|| {
            Error::DataProvider(format!("case '{}' has no expected outcome", self.label))
        })?;

        if let Outcome::Bad { header, details } = &outcome {
            if header.trim().is_empty() {
                return Err(Error::DataProvider(format!(
                    "case '{}' expects failure but has an empty error header",
                    self.label
                )));
            }
            if details.is_empty() {
                return Err(Error::DataProvider(format!(
                    "case '{}' expects failure but lists no error details",
                    self.label
                )));
            }
            let checks = &self.checks;
            if checks.form_check || checks.db_check || checks.remove {
                return Err(Error::DataProvider(format!(
                    "case '{}' combines a failure outcome with success-only post-checks",
                    self.label
                )));
            }
        }

        if self.label.trim().is_empty() {
            return Err(Error::DataProvider("case label cannot be empty".into()));
        }

        Ok(TestCase {
            label: self.label,
            fields: self.fields,
            outcome,
            checks: self.checks,
        })
    }
}

/// Named, ordered collections of test cases
///
/// Purely data: finite, fully materialized, declaration-ordered, no side
/// effects. Registration is where malformed records surface.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Vec<TestCase>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Duplicate names are an author error.
    pub fn register(&mut self, name: &str, cases: Vec<TestCase>) -> Result<()> {
        if self.providers.contains_key(name) {
            return Err(Error::DataProvider(format!(
                "provider '{}' registered twice",
                name
            )));
        }
        if cases.is_empty() {
            return Err(Error::DataProvider(format!(
                "provider '{}' has no cases",
                name
            )));
        }
        self.providers.insert(name.to_string(), cases);
        Ok(())
    }

    /// Cases for one provider, in declaration order
    pub fn provider(&self, name: &str) -> Result<&[TestCase]> {
        self.providers
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::DataProvider(format!("unknown provider '{}'", name)))
    }

    /// All registered provider names
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_an_outcome() {
        let result = TestCase::builder("no outcome").text("name", "x").build();
        assert!(matches!(result, Err(Error::DataProvider(_))));
    }

    #[test]
    fn bad_outcome_requires_details() {
        let result = TestCase::builder("bad without details")
            .bad("Cannot add discovery rule", &[])
            .build();
        assert!(matches!(result, Err(Error::DataProvider(_))));
    }

    #[test]
    fn bad_outcome_rejects_success_checks() {
        let result = TestCase::builder("contradictory")
            .bad("Page received incorrect data", &["some error"])
            .db_check()
            .build();
        assert!(matches!(result, Err(Error::DataProvider(_))));
    }

    #[test]
    fn fields_keep_declaration_order() {
        let case = TestCase::builder("ordered")
            .text("name", "a")
            .option("type", "Zabbix agent")
            .text("key", "b")
            .good("created")
            .build()
            .unwrap();
        let names: Vec<&str> = case.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["name", "type", "key"]);
        assert_eq!(case.text_field("key"), Some("b"));
        assert_eq!(case.option_field("type"), Some("Zabbix agent"));
    }

    #[test]
    fn registry_rejects_duplicates_and_unknowns() {
        let case = TestCase::builder("one").good("done").build().unwrap();
        let mut registry = ProviderRegistry::new();
        registry.register("create", vec![case.clone()]).unwrap();
        assert!(registry.register("create", vec![case]).is_err());
        assert!(registry.provider("missing").is_err());
        assert_eq!(registry.provider("create").unwrap().len(), 1);
    }

    #[test]
    fn sub_rows_carry_remove_flags() {
        let row = SubRow::removed(&[("delay", "50"), ("period", "1,00:00-24:00")]);
        assert!(row.remove);
        assert_eq!(row.values["delay"], "50");
    }
}
