//! Interface conformance: structural (name, arity) checks.
//!
//! A capability is satisfied only by a *method* member of the same name with
//! the same declared arity. Accessors and events never satisfy one, even if
//! their getter returns a function.

use classweave_core::{InterfaceDescriptor, Member, MemberTable, TypeDescriptor};
use tracing::warn;

/// Outcome of a conformance check.
///
/// `member_name` names the first unsatisfied requirement, in the interface's
/// requirement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conformance {
    pub success: bool,
    pub member_name: Option<String>,
}

impl Conformance {
    fn satisfied() -> Self {
        Self {
            success: true,
            member_name: None,
        }
    }

    fn missing(name: &str) -> Self {
        Self {
            success: false,
            member_name: Some(name.to_string()),
        }
    }
}

/// Check a type's flattened member table against an interface.
pub fn implements(candidate: &TypeDescriptor, iface: &InterfaceDescriptor) -> Conformance {
    check_members(candidate.name(), candidate.members(), iface)
}

/// Check a member table that has no descriptor yet.
pub(crate) fn check_members(
    type_name: &str,
    members: &MemberTable,
    iface: &InterfaceDescriptor,
) -> Conformance {
    for capability in iface.required() {
        let satisfied = matches!(
            members.get(&capability.name),
            Some(Member::Method(method)) if method.arity() == capability.arity
        );
        if !satisfied {
            warn!(
                type_name,
                interface = iface.name(),
                member = %capability.name,
                arity = capability.arity,
                "interface requirement not satisfied"
            );
            return Conformance::missing(&capability.name);
        }
    }
    Conformance::satisfied()
}
