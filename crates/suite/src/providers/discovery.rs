//! Discovery-rule data tables
//!
//! Literal scenario rows for the discovery-rule form, transcribed from the
//! application's known behavior. Expected error strings are fixture data and
//! are preserved exactly as the application renders them.

use webcheck_harness::{Result, SubRow, TestCase};

use crate::options::{AuthMethod, CheckType, SecurityLevel};

const CREATED: &str = "Discovery rule created";
const CANNOT_ADD: &str = "Cannot add discovery rule";
const INCORRECT_DATA: &str = "Page received incorrect data";
const NOT_REFRESHED: &str = "Item will not be refreshed. Please enter a correct update interval.";

/// Rows for the create-form sweep
pub fn create_cases() -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();

    // Mandatory-field validation
    cases.push(
        TestCase::builder("empty name and key")
            .bad(
                INCORRECT_DATA,
                &[
                    r#"Incorrect value for field "Name": cannot be empty."#,
                    r#"Incorrect value for field "Key": cannot be empty."#,
                ],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("name without key")
            .text("name", "discoveryRuleError")
            .bad(
                INCORRECT_DATA,
                &[r#"Incorrect value for field "Key": cannot be empty."#],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("key without name")
            .text("key", "discovery-rule-error")
            .bad(
                INCORRECT_DATA,
                &[r#"Incorrect value for field "Name": cannot be empty."#],
            )
            .build()?,
    );

    // Plain create, verified in the form and the backing store
    cases.push(
        TestCase::builder("create discoveryRuleNo1")
            .text("name", "discoveryRuleNo1")
            .text("key", "discovery-key-no1")
            .good(CREATED)
            .form_check()
            .db_check()
            .build()?,
    );
    cases.push(
        TestCase::builder("create and delete discoveryRuleNo2")
            .text("name", "discoveryRuleNo2")
            .text("key", "discovery-key-no2")
            .good(CREATED)
            .form_check()
            .db_check()
            .remove()
            .build()?,
    );

    // Duplicate keys must be rejected without creating a second row
    cases.push(
        TestCase::builder("duplicate key, same name")
            .text("name", "discoveryRuleNo1")
            .text("key", "discovery-key-no1")
            .bad(
                CANNOT_ADD,
                &[r#"Item with key "discovery-key-no1" already exists on "Simple form test host"."#],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("duplicate key, different name")
            .text("name", "discoveryRuleError")
            .text("key", "discovery-key-no1")
            .bad(
                CANNOT_ADD,
                &[r#"Item with key "discovery-key-no1" already exists on "Simple form test host"."#],
            )
            .build()?,
    );

    // Keep-lost-resources period validation
    cases.push(
        TestCase::builder("blank lifetime")
            .text("name", "Discovery lifetime")
            .text("key", "discovery-lifetime-test")
            .overwrite("lifetime", " ")
            .bad(
                INCORRECT_DATA,
                &[r#"Incorrect value for field "lifetime": a time unit is expected."#],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("fractional lifetime")
            .text("name", "Discovery lifetime")
            .text("key", "discovery-lifetime-test")
            .overwrite("lifetime", "1.5")
            .bad(
                INCORRECT_DATA,
                &[r#"Incorrect value for field "lifetime": a time unit is expected."#],
            )
            .build()?,
    );

    // Flexible intervals: zero-delay rows starve the rule
    cases.push(
        TestCase::builder("zero delay with zero flex interval")
            .text("name", "Discovery flex")
            .text("key", "discovery-flex-delay")
            .overwrite("delay", "0")
            .rows(
                "flex_intervals",
                vec![SubRow::new(&[("delay", "0"), ("period", "1-7,00:00-24:00")])],
            )
            .bad(CANNOT_ADD, &[NOT_REFRESHED])
            .build()?,
    );
    cases.push(
        TestCase::builder("zero delay rescued by a working flex interval")
            .text("name", "Discovery flex2")
            .text("key", "discovery-flex-delay2")
            .overwrite("delay", "0")
            .rows(
                "flex_intervals",
                vec![
                    SubRow::new(&[("delay", "50"), ("period", "1-5,00:00-24:00")]),
                    SubRow::new(&[("delay", "50"), ("period", "6-7,00:00-24:00")]),
                ],
            )
            .good(CREATED)
            .db_check()
            .form_check()
            .build()?,
    );
    cases.push(
        TestCase::builder("repeated flex periods")
            .text("name", "Discovery flex repeated")
            .text("key", "discovery-flex-test")
            .rows(
                "flex_intervals",
                vec![
                    SubRow::new(&[("delay", "50"), ("period", "1,00:00-24:00")]),
                    SubRow::new(&[("delay", "50"), ("period", "2,00:00-24:00")]),
                    SubRow::new(&[("delay", "50"), ("period", "1,00:00-24:00")]),
                    SubRow::new(&[("delay", "50"), ("period", "2,00:00-24:00")]),
                ],
            )
            .good(CREATED)
            .build()?,
    );
    cases.push(
        TestCase::builder("flex interval added then removed")
            .text("name", "Discovery flex undone")
            .text("key", "discovery-flex-undone")
            .rows(
                "flex_intervals",
                vec![
                    SubRow::removed(&[("delay", "99"), ("period", "1-5,00:00-24:00")]),
                    SubRow::new(&[("delay", "50"), ("period", "1-7,00:00-24:00")]),
                ],
            )
            .good(CREATED)
            .db_check()
            .build()?,
    );

    // Type-dependent mandatory fields
    cases.push(
        TestCase::builder("SSH agent without credentials")
            .option("type", CheckType::Ssh.label())
            .text("name", "SSH agent error")
            .text("key", "discovery-ssh-agent-error")
            .bad(
                INCORRECT_DATA,
                &[
                    r#"Incorrect value for field "User name": cannot be empty."#,
                    r#"Incorrect value for field "Executed script": cannot be empty."#,
                ],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("IPMI agent without sensor")
            .option("type", CheckType::Ipmi.label())
            .text("name", "IPMI agent error")
            .text("key", "discovery-ipmi-agent-error")
            .bad(
                INCORRECT_DATA,
                &[r#"Incorrect value for field "IPMI sensor": cannot be empty."#],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("SSH agent with the default example key")
            .option("type", CheckType::Ssh.label())
            .option("authtype", AuthMethod::Password.label())
            .text("name", "SSH agent")
            .text("username", "admin")
            .text("params_es", "script to be executed")
            .bad(CANNOT_ADD, &["Check the key, please. Default example was passed."])
            .build()?,
    );
    cases.push(
        TestCase::builder("JMX agent create and delete")
            .option("type", CheckType::Jmx.label())
            .text("name", "JMX agent")
            .text("key", "discovery-jmx-agent")
            .good(CREATED)
            .db_check()
            .form_check()
            .remove()
            .build()?,
    );
    cases.push(
        TestCase::builder("SNMPv3 agent with authPriv")
            .option("type", CheckType::Snmpv3.label())
            .option("snmpv3_securitylevel", SecurityLevel::AuthPriv.label())
            .text("name", "SNMPv3 discovery")
            .text("key", "discovery-snmpv3-agent")
            .good(CREATED)
            .db_check()
            .build()?,
    );

    Ok(cases)
}

/// Names of the pre-seeded rules the no-op update sweep reopens
pub fn update_names() -> Vec<&'static str> {
    vec!["testFormDiscoveryRule1", "testFormDiscoveryRule2"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use webcheck_harness::Outcome;

    #[test]
    fn every_case_builds() {
        let cases = create_cases().unwrap();
        assert!(cases.len() >= 15);
    }

    #[test]
    fn failure_rows_always_list_their_errors() {
        for case in create_cases().unwrap() {
            if let Outcome::Bad { header, details } = &case.outcome {
                assert!(!header.is_empty(), "{}", case.label);
                assert!(!details.is_empty(), "{}", case.label);
                assert!(!case.checks.db_check && !case.checks.form_check && !case.checks.remove);
            }
        }
    }

    #[test]
    fn db_checked_rows_carry_name_and_key() {
        for case in create_cases().unwrap() {
            if case.checks.db_check {
                assert!(case.text_field("name").is_some(), "{}", case.label);
                assert!(case.text_field("key").is_some(), "{}", case.label);
            }
        }
    }

    #[test]
    fn duplicate_key_rows_reuse_an_existing_key() {
        let cases = create_cases().unwrap();
        let created: Vec<&str> = cases
            .iter()
            .filter(|c| c.outcome.is_good())
            .filter_map(|c| c.text_field("key"))
            .collect();
        let duplicates: Vec<&TestCase> = cases
            .iter()
            .filter(|c| c.label.starts_with("duplicate key"))
            .collect();
        assert_eq!(duplicates.len(), 2);
        for case in duplicates {
            let key = case.text_field("key").unwrap();
            assert!(created.contains(&key), "duplicate row must target a created key");
        }
    }
}
