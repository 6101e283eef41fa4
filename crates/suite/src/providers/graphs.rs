//! Graph-prototype data tables
//!
//! Validation rows for the graph-prototype form. Every row here is rejected
//! by the application: a graph prototype cannot be saved without at least one
//! item, and attaching items goes through a picker dialog this suite does not
//! drive. The rows therefore pin down field validation and prove a rejected
//! submission leaves the graphs table untouched.

use webcheck_harness::{Result, TestCase};

use crate::options::GraphType;

const CANNOT_ADD: &str = "Cannot add graph prototype";

/// Rows for the create-form sweep
pub fn create_cases() -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();

    cases.push(
        TestCase::builder("empty form")
            .bad(
                CANNOT_ADD,
                &[
                    r#"Incorrect value for field "name": cannot be empty."#,
                    r#"Field "items" is mandatory."#,
                ],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("name only")
            .text("name", "graphPrototypeError {#KEY}")
            .bad(CANNOT_ADD, &[r#"Field "items" is mandatory."#])
            .build()?,
    );

    // Width bounds
    cases.push(
        TestCase::builder("width below minimum")
            .text("name", "graphPrototypeError {#KEY}")
            .overwrite("width", "19")
            .bad(
                CANNOT_ADD,
                &[
                    r#"Incorrect value for field "width": value must be no less than "20"."#,
                    r#"Field "items" is mandatory."#,
                ],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("width above maximum")
            .text("name", "graphPrototypeError {#KEY}")
            .overwrite("width", "65536")
            .bad(
                CANNOT_ADD,
                &[
                    r#"Incorrect value for field "width": value must be no greater than "65535"."#,
                    r#"Field "items" is mandatory."#,
                ],
            )
            .build()?,
    );
    cases.push(
        TestCase::builder("fractional width")
            .text("name", "graphPrototypeError {#KEY}")
            .overwrite("width", "1.2")
            .bad(
                CANNOT_ADD,
                &[
                    r#"Incorrect value "1.2" for "width" field."#,
                    r#"Field "items" is mandatory."#,
                ],
            )
            .build()?,
    );

    // Height bounds
    cases.push(
        TestCase::builder("blank height")
            .text("name", "graphPrototypeError {#KEY}")
            .overwrite("height", "")
            .bad(
                CANNOT_ADD,
                &[
                    r#"Incorrect value "" for "height" field."#,
                    r#"Field "items" is mandatory."#,
                ],
            )
            .build()?,
    );

    // Items stay mandatory across every graph type
    for graph_type in [GraphType::Stacked, GraphType::Pie, GraphType::Exploded] {
        cases.push(
            TestCase::builder(format!("{} graph without items", graph_type.label()))
                .text("name", "graphPrototypeError {#KEY}")
                .option("graphtype", graph_type.label())
                .bad(CANNOT_ADD, &[r#"Field "items" is mandatory."#])
                .build()?,
        );
    }

    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use webcheck_harness::Outcome;

    #[test]
    fn every_row_is_a_rejection() {
        let cases = create_cases().unwrap();
        assert!(cases.len() >= 8);
        for case in &cases {
            assert!(!case.outcome.is_good(), "{}", case.label);
        }
    }

    #[test]
    fn every_row_expects_the_items_error() {
        for case in create_cases().unwrap() {
            let Outcome::Bad { details, .. } = &case.outcome else {
                unreachable!()
            };
            assert!(
                details.iter().any(|d| d.contains(r#"Field "items" is mandatory."#)),
                "{}",
                case.label
            );
        }
    }
}
