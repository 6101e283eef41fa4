//! Closed option sets for the configuration forms
//!
//! The UI renders these as free-text dropdown labels; keeping them as enums
//! means a typo in a data table is a compile error instead of a timed-out
//! wait on a nonexistent option.

/// Check type offered by the item/discovery forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckType {
    Agent,
    AgentActive,
    SimpleCheck,
    Snmpv1,
    Snmpv2,
    Snmpv3,
    SnmpTrap,
    Internal,
    Trapper,
    External,
    Ipmi,
    Ssh,
    Telnet,
    Jmx,
}

impl CheckType {
    /// The exact label the dropdown renders
    pub fn label(&self) -> &'static str {
        match self {
            CheckType::Agent => "Zabbix agent",
            CheckType::AgentActive => "Zabbix agent (active)",
            CheckType::SimpleCheck => "Simple check",
            CheckType::Snmpv1 => "SNMPv1 agent",
            CheckType::Snmpv2 => "SNMPv2 agent",
            CheckType::Snmpv3 => "SNMPv3 agent",
            CheckType::SnmpTrap => "SNMP trap",
            CheckType::Internal => "Zabbix internal",
            CheckType::Trapper => "Zabbix trapper",
            CheckType::External => "External check",
            CheckType::Ipmi => "IPMI agent",
            CheckType::Ssh => "SSH agent",
            CheckType::Telnet => "TELNET agent",
            CheckType::Jmx => "JMX agent",
        }
    }

    /// Whether this check type binds to a host interface
    pub fn needs_interface(&self) -> bool {
        !matches!(
            self,
            CheckType::AgentActive | CheckType::Internal | CheckType::Trapper
        )
    }

    pub const ALL: [CheckType; 14] = [
        CheckType::Agent,
        CheckType::AgentActive,
        CheckType::SimpleCheck,
        CheckType::Snmpv1,
        CheckType::Snmpv2,
        CheckType::Snmpv3,
        CheckType::SnmpTrap,
        CheckType::Internal,
        CheckType::Trapper,
        CheckType::External,
        CheckType::Ipmi,
        CheckType::Ssh,
        CheckType::Telnet,
        CheckType::Jmx,
    ];
}

/// Authentication method for SSH checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Password,
    PublicKey,
}

impl AuthMethod {
    pub fn label(&self) -> &'static str {
        match self {
            AuthMethod::Password => "Password",
            AuthMethod::PublicKey => "Public key",
        }
    }
}

/// Rendering mode of a graph or graph prototype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphType {
    Normal,
    Stacked,
    Pie,
    Exploded,
}

impl GraphType {
    pub fn label(&self) -> &'static str {
        match self {
            GraphType::Normal => "Normal",
            GraphType::Stacked => "Stacked",
            GraphType::Pie => "Pie",
            GraphType::Exploded => "Exploded",
        }
    }
}

/// SNMPv3 security level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

impl SecurityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SecurityLevel::NoAuthNoPriv => "noAuthNoPriv",
            SecurityLevel::AuthNoPriv => "authNoPriv",
            SecurityLevel::AuthPriv => "authPriv",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<&str> = CheckType::ALL.iter().map(|t| t.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), CheckType::ALL.len());
    }

    #[test_case(CheckType::Trapper, false; "trapper")]
    #[test_case(CheckType::AgentActive, false; "active agent")]
    #[test_case(CheckType::Internal, false; "internal")]
    #[test_case(CheckType::Snmpv3, true; "snmpv3")]
    #[test_case(CheckType::Ipmi, true; "ipmi")]
    fn interface_requirement_follows_the_check_type(check: CheckType, needs: bool) {
        assert_eq!(check.needs_interface(), needs);
    }
}
