// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Directory group to host role translation.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// One `directory group -> host role` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMappingEntry {
    #[serde(alias = "nexusRole")]
    pub host_role: String,

    #[serde(alias = "jiraRole", alias = "crowdGroup")]
    pub directory_group: String,
}

impl RoleMappingEntry {
    pub fn new(host_role: impl Into<String>, directory_group: impl Into<String>) -> Self {
        Self {
            host_role: host_role.into(),
            directory_group: directory_group.into(),
        }
    }
}

/// Translates directory groups into host roles.
///
/// ## Rules
///
/// - A group with a mapping becomes every host role mapped to it.
/// - An unmapped group passes through under its own name, unless `strict`.
/// - With a `filter_group`, users outside that group get no roles at all.
///
/// Group names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMapping {
    entries: Vec<RoleMappingEntry>,
    filter_group: Option<String>,
    strict: bool,
}

impl RoleMapping {
    pub fn new(entries: Vec<RoleMappingEntry>) -> Self {
        Self {
            entries,
            filter_group: None,
            strict: false,
        }
    }

    pub fn with_filter_group(mut self, filter_group: Option<String>) -> Self {
        self.filter_group = filter_group.filter(|group| !group.trim().is_empty());
        self
    }

    /// Drop groups that have no mapping instead of passing them through.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn filter_group(&self) -> Option<&str> {
        self.filter_group.as_deref()
    }

    /// Whether a user with `groups` may receive any role.
    pub fn permits(&self, groups: &HashSet<String>) -> bool {
        match &self.filter_group {
            Some(required) => groups.iter().any(|g| g.eq_ignore_ascii_case(required)),
            None => true,
        }
    }

    /// Host roles for a single directory group.
    pub fn map_role(&self, group: &str) -> Vec<String> {
        let mapped: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.directory_group.eq_ignore_ascii_case(group))
            .map(|entry| entry.host_role.clone())
            .collect();

        if mapped.is_empty() && !self.strict {
            vec![group.to_string()]
        } else {
            mapped
        }
    }

    /// Host roles for a user's full group set, sorted.
    pub fn map_groups(&self, groups: &HashSet<String>) -> BTreeSet<String> {
        if !self.permits(groups) {
            return BTreeSet::new();
        }
        groups.iter().flat_map(|group| self.map_role(group)).collect()
    }
}
