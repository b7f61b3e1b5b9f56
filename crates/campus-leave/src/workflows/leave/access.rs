//! Role gate applied once, before any workflow operation runs.
//!
//! Operations take `&Authorized<C>`; the only way to obtain one is [`Authorized::check`],
//! so a caller cannot reach an operation without the role having been verified.

use std::fmt;
use std::marker::PhantomData;

use super::domain::{Account, AccountId, Role};

/// Role requirement expressed as a type.
pub trait Capability: Send + Sync + 'static {
    const NAME: &'static str;

    fn permits(role: Role) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct StudentRole;

#[derive(Debug, Clone, Copy)]
pub struct MentorRole;

#[derive(Debug, Clone, Copy)]
pub struct DirectorRole;

/// Mentor or director.
#[derive(Debug, Clone, Copy)]
pub struct ReviewerRole;

/// Any signed-in account.
#[derive(Debug, Clone, Copy)]
pub struct AnyRole;

impl Capability for StudentRole {
    const NAME: &'static str = "student";

    fn permits(role: Role) -> bool {
        role == Role::Student
    }
}

impl Capability for MentorRole {
    const NAME: &'static str = "mentor";

    fn permits(role: Role) -> bool {
        role == Role::Mentor
    }
}

impl Capability for DirectorRole {
    const NAME: &'static str = "director";

    fn permits(role: Role) -> bool {
        role == Role::Director
    }
}

impl Capability for ReviewerRole {
    const NAME: &'static str = "reviewer";

    fn permits(role: Role) -> bool {
        role.is_reviewer()
    }
}

impl Capability for AnyRole {
    const NAME: &'static str = "any";

    fn permits(_role: Role) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("sign in required")]
    Unauthenticated,
    #[error("{actor} ({role}) may not perform {required} operations")]
    Forbidden {
        actor: AccountId,
        role: Role,
        required: &'static str,
    },
}

/// An account proven to hold capability `C`.
pub struct Authorized<C: Capability> {
    account: Account,
    _capability: PhantomData<C>,
}

impl<C: Capability> Authorized<C> {
    pub fn check(account: Account) -> Result<Self, AccessError> {
        if C::permits(account.role) {
            Ok(Self {
                account,
                _capability: PhantomData,
            })
        } else {
            tracing::warn!(
                actor = %account.id,
                role = %account.role,
                required = C::NAME,
                "role gate refused access"
            );
            Err(AccessError::Forbidden {
                actor: account.id,
                role: account.role,
                required: C::NAME,
            })
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn id(&self) -> &AccountId {
        &self.account.id
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    pub fn into_account(self) -> Account {
        self.account
    }
}

impl<C: Capability> Clone for Authorized<C> {
    fn clone(&self) -> Self {
        Self {
            account: self.account.clone(),
            _capability: PhantomData,
        }
    }
}

impl<C: Capability> fmt::Debug for Authorized<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorized")
            .field("capability", &C::NAME)
            .field("account", &self.account.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(role: Role) -> Account {
        Account {
            id: AccountId::from_email("someone@suranacollege.edu.in"),
            email: "someone@suranacollege.edu.in".to_string(),
            display_name: "Someone".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn reviewer_gate_admits_mentors_and_directors_only() {
        assert!(Authorized::<ReviewerRole>::check(account(Role::Mentor)).is_ok());
        assert!(Authorized::<ReviewerRole>::check(account(Role::Director)).is_ok());
        match Authorized::<ReviewerRole>::check(account(Role::Student)) {
            Err(AccessError::Forbidden { required, role, .. }) => {
                assert_eq!(required, "reviewer");
                assert_eq!(role, Role::Student);
            }
            other => panic!("expected forbidden, got {other:?}"),
        }
    }

    #[test]
    fn single_role_gates_are_exact() {
        assert!(Authorized::<StudentRole>::check(account(Role::Student)).is_ok());
        assert!(Authorized::<StudentRole>::check(account(Role::Mentor)).is_err());
        assert!(Authorized::<MentorRole>::check(account(Role::Director)).is_err());
        assert!(Authorized::<DirectorRole>::check(account(Role::Mentor)).is_err());
        assert!(Authorized::<AnyRole>::check(account(Role::Student)).is_ok());
    }
}
