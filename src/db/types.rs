use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "customerstatus", rename_all = "lowercase")]
pub(crate) enum CustomerStatus {
    Contacted,
    Signed,
    Current,
    Renewal,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "projectstatus", rename_all = "snake_case")]
pub(crate) enum ProjectStatus {
    Drafted,
    InProgress,
    Completed,
}
