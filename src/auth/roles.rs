// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staff roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Staff roles for authorization.
///
/// The set is closed and flat: there is no hierarchy, and a route gated on
/// one role never admits the other.
///
/// - `Receptionist` - Registers patients and manages their records
/// - `Doctor` - Reads and updates patient records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Front desk staff
    Receptionist,
    /// Medical staff
    Doctor,
}

impl Role {
    /// Parse a role from its wire form.
    ///
    /// Matching is exact (`"receptionist"` or `"doctor"`); anything else is
    /// rejected at the registration boundary.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "receptionist" => Some(Role::Receptionist),
            "doctor" => Some(Role::Doctor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Receptionist => "receptionist",
            Role::Doctor => "doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
