//! Data providers
//!
//! One module per form, each exposing its scenario rows as plain data.
//! `registry()` assembles them all; building it is itself a validation pass,
//! since every row goes through the record builder.

use webcheck_harness::{ProviderRegistry, Result};

pub mod discovery;
pub mod graphs;

pub const DISCOVERY_CREATE: &str = "discovery.create";
pub const GRAPH_PROTOTYPE_CREATE: &str = "graph_prototype.create";

/// All providers the sweep binary knows about
pub fn registry() -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    registry.register(DISCOVERY_CREATE, discovery::create_cases()?)?;
    registry.register(GRAPH_PROTOTYPE_CREATE, graphs::create_cases()?)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_assembles_cleanly() {
        let registry = registry().unwrap();
        assert_eq!(
            registry.names(),
            vec![DISCOVERY_CREATE, GRAPH_PROTOTYPE_CREATE]
        );
        assert!(!registry.provider(DISCOVERY_CREATE).unwrap().is_empty());
    }
}
