//! User type (filterable through the same predicate tree as incidents)

use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    pub id: i64,
}
