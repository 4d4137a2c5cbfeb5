// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity records produced by the directory.

use serde::{Deserialize, Serialize};

/// Account status as reported by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Disabled,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Disabled => write!(f, "disabled"),
        }
    }
}

/// A user as the directory describes it.
///
/// Never cached by the realm; callers that want identity caching do it on
/// their side of the [`DirectoryClient`](super::DirectoryClient) boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteIdentity {
    /// Login name, the canonical key for the realm.
    pub user_id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    pub active: bool,

    #[serde(default)]
    pub status: UserStatus,
}

impl RemoteIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            first_name: None,
            last_name: None,
            email: None,
            active: true,
            status: UserStatus::Active,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_names(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        let first = first.into();
        let last = last.into();
        self.display_name = Some(format!("{first} {last}"));
        self.first_name = Some(first);
        self.last_name = Some(last);
        self
    }

    /// Mark the account disabled.
    pub fn disabled(mut self) -> Self {
        self.active = false;
        self.status = UserStatus::Disabled;
        self
    }
}

/// Filter for user searches.
///
/// `user_id` is a prefix matched against the login name, first name, last
/// name and email. `email` is a prefix matched against the email only. Unset
/// terms match everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchCriteria {
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl UserSearchCriteria {
    pub fn by_user_id(prefix: impl Into<String>) -> Self {
        Self {
            user_id: Some(prefix.into()),
            email: None,
        }
    }

    pub fn by_email(prefix: impl Into<String>) -> Self {
        Self {
            user_id: None,
            email: Some(prefix.into()),
        }
    }

    pub fn matches(&self, user: &RemoteIdentity) -> bool {
        let starts = |field: &Option<String>, prefix: &str| {
            field.as_deref().is_some_and(|value| value.starts_with(prefix))
        };

        let user_id_ok = match self.user_id.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => {
                user.user_id.starts_with(prefix)
                    || starts(&user.first_name, prefix)
                    || starts(&user.last_name, prefix)
                    || starts(&user.email, prefix)
            }
            None => true,
        };
        let email_ok = match self.email.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => starts(&user.email, prefix),
            None => true,
        };
        user_id_ok && email_ok
    }
}

/// A group as the directory lists it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteGroup {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl RemoteGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_names_and_status() {
        let user = RemoteIdentity::new("alice")
            .with_names("Alice", "Liddell")
            .with_email("alice@example.com")
            .disabled();

        assert_eq!(user.display_name.as_deref(), Some("Alice Liddell"));
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert!(!user.active);
        assert_eq!(user.status, UserStatus::Disabled);
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let user: RemoteIdentity =
            serde_json::from_str(r#"{"userId":"bob","active":true,"email":"bob@example.com"}"#)
                .unwrap();
        assert_eq!(user.user_id, "bob");
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.first_name.is_none());
    }

    #[test]
    fn criteria_match_any_name_field_by_prefix() {
        let user = RemoteIdentity::new("jdoe")
            .with_names("John", "Doe")
            .with_email("john.doe@example.com");

        assert!(UserSearchCriteria::by_user_id("jd").matches(&user));
        assert!(UserSearchCriteria::by_user_id("Jo").matches(&user));
        assert!(UserSearchCriteria::by_user_id("Do").matches(&user));
        assert!(UserSearchCriteria::by_user_id("john.").matches(&user));
        assert!(!UserSearchCriteria::by_user_id("smith").matches(&user));
        assert!(UserSearchCriteria::default().matches(&user));
    }

    #[test]
    fn email_criterion_only_checks_email() {
        let user = RemoteIdentity::new("jdoe").with_email("jd@example.com");
        assert!(UserSearchCriteria::by_email("jd@").matches(&user));
        assert!(!UserSearchCriteria::by_email("jdoe").matches(&user));
        assert!(!UserSearchCriteria::by_email("x").matches(&RemoteIdentity::new("nomail")));

        let both = UserSearchCriteria {
            user_id: Some("jd".into()),
            email: Some("other".into()),
        };
        assert!(!both.matches(&user));
    }

    #[test]
    fn group_description_is_optional() {
        let group: RemoteGroup = serde_json::from_str(r#"{"name":"nexus-admins"}"#).unwrap();
        assert_eq!(group, RemoteGroup::new("nexus-admins"));
        assert_eq!(
            RemoteGroup::new("devs").with_description("Developers").description.as_deref(),
            Some("Developers")
        );
    }
}
