//! Node role bit mask, advertised in [`crate::NetworkNode::role`] and queried
//! via `best_node_by_role` (spec §2.2, supplemented from the original's
//! `RoleService`). The application owns and sets this; the engine only
//! carries and propagates it.

/// Bit mask of node roles. The low bit is reserved for the gateway role the
/// original names explicitly; the rest is free for application use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Role(pub u8);

impl Role {
    pub const NONE: Role = Role(0);
    pub const GATEWAY: Role = Role(0x01);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Role) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn with(self, other: Role) -> Role {
        Role(self.0 | other.0)
    }
}

impl From<u8> for Role {
    fn from(bits: u8) -> Self {
        Role(bits)
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_role_is_contained_after_combining() {
        let role = Role::NONE.with(Role::GATEWAY).with(Role(0x10));
        assert!(role.contains(Role::GATEWAY));
        assert_eq!(role.bits(), 0x11);
    }
}
