//! Role-based gating of user actions.
//!
//! Every role maps to a fixed set of actions. Lookups are pure and lock-free;
//! unknown roles or actions are denied.

use crate::errors::PolicyError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identity classification attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Operator,
    Viewer,
}

impl Role {
    /// Roles from most to least privileged.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Operator, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Viewer => "viewer",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Role::Admin),
            "operator" => Ok(Role::Operator),
            "viewer" => Ok(Role::Viewer),
            _ => Err(()),
        }
    }
}

/// Operation subject to a permission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    Create = 0,
    Approve = 1,
    Deploy = 2,
    Rollback = 3,
    View = 4,
    Schedule = 5,
    Bulk = 6,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Create,
        Action::Approve,
        Action::Deploy,
        Action::Rollback,
        Action::View,
        Action::Schedule,
        Action::Bulk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Approve => "approve",
            Action::Deploy => "deploy",
            Action::Rollback => "rollback",
            Action::View => "view",
            Action::Schedule => "schedule",
            Action::Bulk => "bulk",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action tokens match exactly; `"View"` is not `view`.
impl FromStr for Action {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Permissions(u8);

impl Permissions {
    const fn of(actions: &[Action]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < actions.len() {
            bits |= 1 << (actions[i] as u8);
            i += 1;
        }
        Permissions(bits)
    }

    fn allows(self, action: Action) -> bool {
        (self.0 & (1 << (action as u8))) != 0
    }

    fn with(self, action: Action) -> Self {
        Permissions(self.0 | (1 << (action as u8)))
    }

    /// First action granted by `other` but not by `self`.
    fn first_missing(self, other: Self) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|action| other.allows(*action) && !self.allows(*action))
    }
}

/// Immutable role → actions table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionMatrix {
    grants: [Permissions; 3],
}

static REFERENCE: PermissionMatrix = PermissionMatrix {
    grants: [
        Permissions::of(&[
            Action::Create,
            Action::Approve,
            Action::Deploy,
            Action::Rollback,
            Action::View,
            Action::Schedule,
            Action::Bulk,
        ]),
        Permissions::of(&[
            Action::Create,
            Action::Deploy,
            Action::View,
            Action::Schedule,
            Action::Bulk,
        ]),
        Permissions::of(&[Action::View]),
    ],
};

impl PermissionMatrix {
    /// The platform's built-in table.
    pub fn reference() -> &'static PermissionMatrix {
        &REFERENCE
    }

    /// Build a custom table. Fails unless `admin ⊇ operator ⊇ viewer`.
    pub fn new<I, A>(grants: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (Role, A)>,
        A: IntoIterator<Item = Action>,
    {
        let mut table = [Permissions::default(); 3];
        for (role, actions) in grants {
            let slot = &mut table[role.index()];
            for action in actions {
                *slot = slot.with(action);
            }
        }

        for pair in Role::ALL.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            if let Some(action) = table[upper.index()].first_missing(table[lower.index()]) {
                return Err(PolicyError::NotHierarchical {
                    upper: upper.as_str(),
                    lower: lower.as_str(),
                    action: action.as_str(),
                });
            }
        }

        Ok(Self { grants: table })
    }

    pub fn allows(&self, role: Role, action: Action) -> bool {
        self.grants[role.index()].allows(action)
    }

    /// String-level check; unknown roles or actions are denied.
    pub fn is_allowed(&self, role: &str, action: &str) -> bool {
        match (role.parse::<Role>(), action.parse::<Action>()) {
            (Ok(role), Ok(action)) => self.allows(role, action),
            _ => false,
        }
    }

    /// Actions granted to `role`, in declaration order.
    pub fn actions(&self, role: Role) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.allows(role, *action))
            .collect()
    }
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        REFERENCE.clone()
    }
}

impl Serialize for PermissionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(Role::ALL.iter().map(|role| {
            let actions: Vec<&'static str> =
                self.actions(*role).iter().map(Action::as_str).collect();
            (role.as_str(), actions)
        }))
    }
}

/// Check `action` for `role` against the built-in table.
pub fn is_allowed(role: &str, action: &str) -> bool {
    PermissionMatrix::reference().is_allowed(role, action)
}
