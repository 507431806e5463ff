use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Customer;
use crate::db::types::CustomerStatus;
use crate::repositories::list::{Column, ColumnKind, ResourceTable};

const COLUMNS: &str = "\
    id, name, slug, description, website, email, phone, address, status, photo, \
    contract_date, renewal_date, created_at, updated_at";

pub(crate) const LISTABLE: ResourceTable = ResourceTable {
    table: "customers",
    created_column: "created_at",
    columns: &[
        Column { name: "id", kind: ColumnKind::Text },
        Column { name: "name", kind: ColumnKind::Text },
        Column { name: "slug", kind: ColumnKind::Text },
        Column { name: "description", kind: ColumnKind::Text },
        Column { name: "website", kind: ColumnKind::Text },
        Column { name: "email", kind: ColumnKind::Text },
        Column { name: "phone", kind: ColumnKind::Text },
        Column { name: "address", kind: ColumnKind::Text },
        Column { name: "status", kind: ColumnKind::Enum("customerstatus") },
        Column { name: "photo", kind: ColumnKind::Text },
        Column { name: "contract_date", kind: ColumnKind::Timestamp },
        Column { name: "renewal_date", kind: ColumnKind::Timestamp },
        Column { name: "created_at", kind: ColumnKind::Timestamp },
        Column { name: "updated_at", kind: ColumnKind::Timestamp },
    ],
    relations: &[],
};

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM customers WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateCustomer<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub website: Option<&'a str>,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub address: &'a str,
    pub status: CustomerStatus,
    pub contract_date: Option<PrimitiveDateTime>,
    pub renewal_date: Option<PrimitiveDateTime>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCustomer<'_>,
) -> Result<Customer, sqlx::Error> {
    sqlx::query_as::<_, Customer>(&format!(
        "INSERT INTO customers (
            id, name, slug, description, website, email, phone, address, status,
            contract_date, renewal_date, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.website)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.address)
    .bind(params.status)
    .bind(params.contract_date)
    .bind(params.renewal_date)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateCustomer {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<CustomerStatus>,
    pub contract_date: Option<PrimitiveDateTime>,
    pub renewal_date: Option<PrimitiveDateTime>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateCustomer,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(&format!(
        "UPDATE customers SET
            name = COALESCE($1, name),
            slug = COALESCE($2, slug),
            description = COALESCE($3, description),
            website = COALESCE($4, website),
            email = COALESCE($5, email),
            phone = COALESCE($6, phone),
            address = COALESCE($7, address),
            status = COALESCE($8, status),
            contract_date = COALESCE($9, contract_date),
            renewal_date = COALESCE($10, renewal_date),
            updated_at = $11
         WHERE id = $12
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.website)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.address)
    .bind(params.status)
    .bind(params.contract_date)
    .bind(params.renewal_date)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Deletes the customer; its projects go with it via the FK cascade.
pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
