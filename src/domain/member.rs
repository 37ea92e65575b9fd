// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data union member record

use serde::{Deserialize, Serialize};

use super::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Active,
    Inactive,
}

/// Membership of one address in one data union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub address: Address,
    pub data_union: Address,
    /// Timestamp of the most recent join
    pub join_date: u64,
    pub status: MemberStatus,
}

impl Member {
    /// Record written by a join; a rejoin replaces the previous record
    pub fn joined(address: Address, data_union: Address, join_date: u64) -> Self {
        Self {
            id: member_id(&address, &data_union),
            address,
            data_union,
            join_date,
            status: MemberStatus::Active,
        }
    }

    pub fn part(&mut self) {
        self.status = MemberStatus::Inactive;
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Store key of a member: `{member}-{union}`
pub fn member_id(member: &Address, union: &Address) -> String {
    format!("{}-{}", member, union)
}
