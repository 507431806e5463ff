use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Project;
use crate::db::types::ProjectStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProjectCreate {
    #[validate(length(min = 1, max = 120))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
    #[serde(default = "default_status")]
    pub(crate) status: ProjectStatus,
    #[serde(default)]
    #[serde(alias = "startDate")]
    pub(crate) start_date: Option<String>,
    #[serde(default)]
    #[serde(alias = "endDate")]
    pub(crate) end_date: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProjectUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 120))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<ProjectStatus>,
    #[serde(default)]
    #[serde(alias = "startDate")]
    pub(crate) start_date: Option<String>,
    #[serde(default)]
    #[serde(alias = "endDate")]
    pub(crate) end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectResponse {
    pub(crate) id: String,
    pub(crate) customer_id: String,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) status: ProjectStatus,
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ProjectResponse {
    pub(crate) fn from_db(project: Project) -> Self {
        Self {
            id: project.id,
            customer_id: project.customer_id,
            title: project.title,
            slug: project.slug,
            description: project.description,
            status: project.status,
            start_date: project.start_date.map(format_primitive),
            end_date: project.end_date.map(format_primitive),
            created_at: format_primitive(project.created_at),
            updated_at: format_primitive(project.updated_at),
        }
    }
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Drafted
}
