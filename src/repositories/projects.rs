use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Project;
use crate::db::types::ProjectStatus;
use crate::repositories::list::{Column, ColumnKind, Relation, ResourceTable};

const COLUMNS: &str = "\
    id, customer_id, title, slug, description, status, start_date, end_date, \
    created_at, updated_at";

pub(crate) const LISTABLE: ResourceTable = ResourceTable {
    table: "projects",
    created_column: "created_at",
    columns: &[
        Column { name: "id", kind: ColumnKind::Text },
        Column { name: "customer_id", kind: ColumnKind::Text },
        Column { name: "title", kind: ColumnKind::Text },
        Column { name: "slug", kind: ColumnKind::Text },
        Column { name: "description", kind: ColumnKind::Text },
        Column { name: "status", kind: ColumnKind::Enum("projectstatus") },
        Column { name: "start_date", kind: ColumnKind::Timestamp },
        Column { name: "end_date", kind: ColumnKind::Timestamp },
        Column { name: "created_at", kind: ColumnKind::Timestamp },
        Column { name: "updated_at", kind: ColumnKind::Timestamp },
    ],
    relations: &[Relation {
        attribute: "customer",
        local_key: "customer_id",
        table: "customers",
        columns: &[
            Column { name: "id", kind: ColumnKind::Text },
            Column { name: "name", kind: ColumnKind::Text },
            Column { name: "status", kind: ColumnKind::Enum("customerstatus") },
        ],
    }],
};

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateProject<'a> {
    pub id: &'a str,
    pub customer_id: &'a str,
    pub title: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub status: ProjectStatus,
    pub start_date: Option<PrimitiveDateTime>,
    pub end_date: Option<PrimitiveDateTime>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateProject<'_>,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "INSERT INTO projects (
            id, customer_id, title, slug, description, status, start_date, end_date,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.customer_id)
    .bind(params.title)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.status)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateProject {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<PrimitiveDateTime>,
    pub end_date: Option<PrimitiveDateTime>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateProject,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "UPDATE projects SET
            title = COALESCE($1, title),
            slug = COALESCE($2, slug),
            description = COALESCE($3, description),
            status = COALESCE($4, status),
            start_date = COALESCE($5, start_date),
            end_date = COALESCE($6, end_date),
            updated_at = $7
         WHERE id = $8
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.status)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
