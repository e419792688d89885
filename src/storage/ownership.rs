// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership matching for stored resources.
//!
//! This is the pure half of ownership enforcement: it decides whether an
//! identity owns a record without touching storage. The resolver in
//! `auth::ownership` adds the fetch and the self-healing write-back.

use crate::auth::Identity;
use crate::models::Bot;

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// The owner's user id as last recorded.
    fn owner_id(&self) -> &str;

    /// The owner's phone number, if one was captured.
    fn owner_phone_number(&self) -> Option<&str>;

    /// Decide how (or whether) `identity` owns this resource.
    fn match_owner(&self, identity: &Identity) -> OwnerMatch {
        if self.owner_id() == identity.subject_id {
            return OwnerMatch::Direct;
        }

        match (identity.phone_number.as_deref(), self.owner_phone_number()) {
            (Some(theirs), Some(ours)) if !ours.is_empty() && theirs == ours => {
                OwnerMatch::PhoneFallback
            }
            _ => OwnerMatch::Denied,
        }
    }
}

/// Outcome of matching an identity against a resource's owner fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerMatch {
    /// `subject_id` equals the recorded owner id.
    Direct,
    /// Ids differ but the phone numbers agree; the record's owner id is stale.
    PhoneFallback,
    /// Neither id nor phone number matches.
    Denied,
}

impl OwnerMatch {
    pub fn is_owner(self) -> bool {
        !matches!(self, OwnerMatch::Denied)
    }
}

impl OwnedResource for Bot {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn owner_phone_number(&self) -> Option<&str> {
        self.owner_phone_number.as_deref()
    }
}
