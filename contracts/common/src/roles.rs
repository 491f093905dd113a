use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ttl;

const ROLE: Symbol = symbol_short!("ROLE");

/// Capabilities that an admin can delegate to other addresses.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Role {
    /// May credit custody deposits and start reward periods.
    Funder,
}

fn role_key(role: &Role, address: &Address) -> (Symbol, Role, Address) {
    (ROLE, role.clone(), address.clone())
}

/// Grants `role` to `address`.
pub fn grant_role(env: &Env, role: &Role, address: &Address) {
    let key = role_key(role, address);
    env.storage().persistent().set(&key, &true);
    ttl::extend_persistent(env, &key);
}

/// Revokes `role` from `address`. Revoking an absent grant is a no-op.
pub fn revoke_role(env: &Env, role: &Role, address: &Address) {
    env.storage().persistent().remove(&role_key(role, address));
}

/// Returns whether `address` currently holds `role`.
pub fn has_role(env: &Env, role: &Role, address: &Address) -> bool {
    let key = role_key(role, address);
    let granted = env.storage().persistent().get(&key).unwrap_or(false);
    if granted {
        ttl::extend_persistent(env, &key);
    }
    granted
}

/// Returns whether `caller` passes the gate for `role`.
///
/// The contract admin always passes; anyone else needs an explicit grant.
pub fn require_role_or_admin(env: &Env, role: &Role, caller: &Address, admin: &Address) -> bool {
    caller == admin || has_role(env, role, caller)
}
