use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::api::list_query::{FilterClause, FilterOp, ListQuery, SortKey};
use crate::core::time::{format_primitive, to_primitive_utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Text,
    Bool,
    Timestamp,
    /// Backed by a Postgres enum type; bound as text and cast in SQL,
    /// selected back as text.
    Enum(&'static str),
}

#[derive(Debug)]
pub(crate) struct Column {
    pub(crate) name: &'static str,
    pub(crate) kind: ColumnKind,
}

/// A foreign-key relation that list endpoints may expand inline.
#[derive(Debug)]
pub(crate) struct Relation {
    /// JSON attribute added to each record.
    pub(crate) attribute: &'static str,
    /// Referencing column on the listed table.
    pub(crate) local_key: &'static str,
    pub(crate) table: &'static str,
    pub(crate) columns: &'static [Column],
}

/// Declares which table, columns, and relations a resource exposes to the
/// generic listing engine. Filter, sort, and select fields are validated
/// against `columns`, so anything sensitive (password hashes) stays out by
/// simply not being declared.
#[derive(Debug)]
pub(crate) struct ResourceTable {
    pub(crate) table: &'static str,
    pub(crate) created_column: &'static str,
    pub(crate) columns: &'static [Column],
    pub(crate) relations: &'static [Relation],
}

impl ResourceTable {
    fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    fn relation(&self, attribute: &str) -> Option<&'static Relation> {
        self.relations.iter().find(|relation| relation.attribute == attribute)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ListError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
    #[error("operator not supported for field: {0}")]
    UnsupportedOperator(String),
    #[error("query execution failed")]
    Query(#[from] sqlx::Error),
}

pub(crate) struct ListPage {
    pub(crate) total: i64,
    pub(crate) records: Vec<Value>,
}

/// Runs one page of a generic list request: a filtered COUNT, the page
/// fetch, and any requested relation expansion. The two statements are
/// independent round trips, so the total can drift from the fetched page
/// under concurrent writes.
pub(crate) async fn run_list(
    pool: &PgPool,
    table: &ResourceTable,
    query: &ListQuery,
    populate: &[&str],
) -> Result<ListPage, ListError> {
    let mut count_builder = build_count_query(table, query)?;
    let total: i64 = count_builder.build_query_scalar().fetch_one(pool).await?;

    let (mut page_builder, columns) = build_page_query(table, query)?;
    let rows = page_builder.build().fetch_all(pool).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        records.push(Value::Object(row_to_record(row, &columns)?));
    }

    for attribute in populate {
        let relation = table
            .relation(attribute)
            .ok_or_else(|| ListError::UnknownField(attribute.to_string()))?;
        populate_relation(pool, relation, &mut records).await?;
    }

    Ok(ListPage { total, records })
}

fn build_page_query(
    table: &ResourceTable,
    query: &ListQuery,
) -> Result<(QueryBuilder<'static, Postgres>, Vec<&'static Column>), ListError> {
    let columns = projected_columns(table, query)?;

    let mut builder = QueryBuilder::new("SELECT ");
    for (index, column) in columns.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(column_expr(column));
    }
    builder.push(" FROM ");
    builder.push(table.table);

    push_where(&mut builder, table, &query.filters)?;
    push_order_by(&mut builder, table, query)?;

    builder.push(" LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset());

    Ok((builder, columns))
}

fn build_count_query(
    table: &ResourceTable,
    query: &ListQuery,
) -> Result<QueryBuilder<'static, Postgres>, ListError> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(table.table);
    push_where(&mut builder, table, &query.filters)?;
    Ok(builder)
}

fn projected_columns(
    table: &ResourceTable,
    query: &ListQuery,
) -> Result<Vec<&'static Column>, ListError> {
    let Some(selected) = &query.select else {
        return Ok(table.columns.iter().collect());
    };

    // The identifier column always comes back, selected or not.
    let id = table.column("id").ok_or_else(|| ListError::UnknownField("id".to_string()))?;
    let mut columns = vec![id];
    for field in selected {
        let column =
            table.column(field).ok_or_else(|| ListError::UnknownField(field.clone()))?;
        if !columns.iter().any(|existing| existing.name == column.name) {
            columns.push(column);
        }
    }
    Ok(columns)
}

fn column_expr(column: &Column) -> String {
    match column.kind {
        ColumnKind::Enum(_) => format!("{name}::text AS {name}", name = column.name),
        _ => column.name.to_string(),
    }
}

fn push_where(
    builder: &mut QueryBuilder<'static, Postgres>,
    table: &ResourceTable,
    filters: &[FilterClause],
) -> Result<(), ListError> {
    let mut has_where = false;

    for clause in filters {
        let column = table
            .column(&clause.field)
            .ok_or_else(|| ListError::UnknownField(clause.field.clone()))?;

        builder.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;
        builder.push(column.name);

        if clause.op == FilterOp::In {
            push_in_clause(builder, column, clause)?;
            continue;
        }

        builder.push(" ");
        builder.push(clause.op.sql());
        builder.push(" ");
        push_scalar_bind(builder, column, clause)?;
    }

    Ok(())
}

fn push_scalar_bind(
    builder: &mut QueryBuilder<'static, Postgres>,
    column: &Column,
    clause: &FilterClause,
) -> Result<(), ListError> {
    match column.kind {
        ColumnKind::Text => {
            builder.push_bind(clause.value.clone());
        }
        ColumnKind::Enum(type_name) => {
            builder.push_bind(clause.value.clone());
            builder.push(format!("::{type_name}"));
        }
        ColumnKind::Bool => {
            builder.push_bind(parse_bool_value(clause)?);
        }
        ColumnKind::Timestamp => {
            builder.push_bind(parse_timestamp_value(clause)?);
        }
    }
    Ok(())
}

fn push_in_clause(
    builder: &mut QueryBuilder<'static, Postgres>,
    column: &Column,
    clause: &FilterClause,
) -> Result<(), ListError> {
    let values: Vec<&str> =
        clause.value.split(',').map(str::trim).filter(|item| !item.is_empty()).collect();

    builder.push(" = ANY(");
    match column.kind {
        ColumnKind::Text => {
            let items: Vec<String> = values.iter().map(|item| item.to_string()).collect();
            builder.push_bind(items);
        }
        ColumnKind::Enum(type_name) => {
            let items: Vec<String> = values.iter().map(|item| item.to_string()).collect();
            builder.push_bind(items);
            builder.push(format!("::{type_name}[]"));
        }
        ColumnKind::Timestamp => {
            let mut items = Vec::with_capacity(values.len());
            for item in values {
                items.push(parse_timestamp(item).ok_or_else(|| ListError::InvalidValue {
                    field: clause.field.clone(),
                    value: item.to_string(),
                })?);
            }
            builder.push_bind(items);
        }
        ColumnKind::Bool => {
            return Err(ListError::UnsupportedOperator(clause.field.clone()));
        }
    }
    builder.push(")");
    Ok(())
}

fn push_order_by(
    builder: &mut QueryBuilder<'static, Postgres>,
    table: &ResourceTable,
    query: &ListQuery,
) -> Result<(), ListError> {
    builder.push(" ORDER BY ");

    let Some(sort) = &query.sort else {
        // No explicit sort: newest records first.
        builder.push(table.created_column);
        builder.push(" DESC");
        return Ok(());
    };

    if sort.is_empty() {
        builder.push(table.created_column);
        builder.push(" DESC");
        return Ok(());
    }

    for (index, key) in sort.iter().enumerate() {
        let SortKey { field, descending } = key;
        let column =
            table.column(field).ok_or_else(|| ListError::UnknownField(field.clone()))?;
        if index > 0 {
            builder.push(", ");
        }
        builder.push(column.name);
        builder.push(if *descending { " DESC" } else { " ASC" });
    }

    Ok(())
}

fn parse_bool_value(clause: &FilterClause) -> Result<bool, ListError> {
    match clause.value.as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ListError::InvalidValue {
            field: clause.field.clone(),
            value: clause.value.clone(),
        }),
    }
}

fn parse_timestamp_value(clause: &FilterClause) -> Result<PrimitiveDateTime, ListError> {
    parse_timestamp(&clause.value).ok_or_else(|| ListError::InvalidValue {
        field: clause.field.clone(),
        value: clause.value.clone(),
    })
}

/// Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS`, or a date-only value
/// (midnight UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(to_primitive_utc(parsed));
    }

    let datetime_format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(parsed) = PrimitiveDateTime::parse(raw, datetime_format) {
        return Some(parsed);
    }

    let date_format = format_description!("[year]-[month]-[day]");
    if let Ok(parsed) = Date::parse(raw, date_format) {
        return Some(PrimitiveDateTime::new(parsed, Time::MIDNIGHT));
    }

    None
}

fn row_to_record(row: &PgRow, columns: &[&Column]) -> Result<Map<String, Value>, ListError> {
    let mut record = Map::with_capacity(columns.len());
    for column in columns {
        let value = match column.kind {
            ColumnKind::Text | ColumnKind::Enum(_) => row
                .try_get::<Option<String>, _>(column.name)?
                .map_or(Value::Null, Value::String),
            ColumnKind::Bool => {
                row.try_get::<Option<bool>, _>(column.name)?.map_or(Value::Null, Value::Bool)
            }
            ColumnKind::Timestamp => row
                .try_get::<Option<PrimitiveDateTime>, _>(column.name)?
                .map_or(Value::Null, |ts| Value::String(format_primitive(ts))),
        };
        record.insert(column.name.to_string(), value);
    }
    Ok(record)
}

/// Expands a relation on each fetched record with a single batched lookup,
/// keyed on the referencing column's distinct values.
async fn populate_relation(
    pool: &PgPool,
    relation: &Relation,
    records: &mut [Value],
) -> Result<(), ListError> {
    let mut ids: Vec<String> = records
        .iter()
        .filter_map(|record| record.get(relation.local_key))
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect();
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        return Ok(());
    }

    let columns: Vec<&Column> = relation.columns.iter().collect();
    let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
    for (index, column) in columns.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(column_expr(column));
    }
    builder.push(" FROM ");
    builder.push(relation.table);
    builder.push(" WHERE id = ANY(");
    builder.push_bind(ids);
    builder.push(")");

    let rows = builder.build().fetch_all(pool).await?;
    let mut related = Map::new();
    for row in &rows {
        let record = row_to_record(row, &columns)?;
        if let Some(Value::String(id)) = record.get("id").cloned() {
            related.insert(id, Value::Object(record));
        }
    }

    for record in records.iter_mut() {
        let Some(key) = record.get(relation.local_key).and_then(Value::as_str) else {
            continue;
        };
        let expanded = related.get(key).cloned().unwrap_or(Value::Null);
        if let Value::Object(map) = record {
            map.insert(relation.attribute.to_string(), expanded);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::api::list_query::ListQuery;

    const THINGS: ResourceTable = ResourceTable {
        table: "things",
        created_column: "created_at",
        columns: &[
            Column { name: "id", kind: ColumnKind::Text },
            Column { name: "name", kind: ColumnKind::Text },
            Column { name: "status", kind: ColumnKind::Enum("thingstatus") },
            Column { name: "archived", kind: ColumnKind::Bool },
            Column { name: "created_at", kind: ColumnKind::Timestamp },
        ],
        relations: &[],
    };

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let params: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ListQuery::from_params(&params)
    }

    #[test]
    fn default_query_selects_everything_newest_first() {
        let (builder, columns) = build_page_query(&THINGS, &query(&[])).expect("build");
        assert_eq!(
            builder.sql(),
            "SELECT id, name, status::text AS status, archived, created_at FROM things \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        assert_eq!(columns.len(), THINGS.columns.len());
    }

    #[test]
    fn equality_filter_on_enum_casts_the_bind() {
        let (builder, _) =
            build_page_query(&THINGS, &query(&[("status", "active")])).expect("build");
        assert_eq!(
            builder.sql(),
            "SELECT id, name, status::text AS status, archived, created_at FROM things \
             WHERE status = $1::thingstatus ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn range_filter_binds_parsed_timestamp() {
        let (builder, _) = build_page_query(&THINGS, &query(&[("created_at[gte]", "2024-01-01")]))
            .expect("build");
        assert!(builder.sql().contains("WHERE created_at >= $1"));
    }

    #[test]
    fn in_filter_uses_any_with_array_cast() {
        let (builder, _) =
            build_page_query(&THINGS, &query(&[("status[in]", "active, archived")]))
                .expect("build");
        assert!(builder.sql().contains("WHERE status = ANY($1::thingstatus[])"));

        let (builder, _) =
            build_page_query(&THINGS, &query(&[("name[in]", "a,b")])).expect("build");
        assert!(builder.sql().contains("WHERE name = ANY($1)"));
    }

    #[test]
    fn multiple_filters_join_with_and() {
        let (builder, _) =
            build_page_query(&THINGS, &query(&[("archived", "false"), ("name", "x")]))
                .expect("build");
        assert!(builder.sql().contains("WHERE archived = $1 AND name = $2"));
    }

    #[test]
    fn select_projects_and_reincludes_id() {
        let (builder, columns) =
            build_page_query(&THINGS, &query(&[("select", "name,status")])).expect("build");
        assert!(builder.sql().starts_with("SELECT id, name, status::text AS status FROM"));
        assert_eq!(columns.iter().map(|c| c.name).collect::<Vec<_>>(), ["id", "name", "status"]);
    }

    #[test]
    fn sort_validates_fields_and_direction() {
        let (builder, _) =
            build_page_query(&THINGS, &query(&[("sort", "-status,name")])).expect("build");
        assert!(builder.sql().contains("ORDER BY status DESC, name ASC"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            build_page_query(&THINGS, &query(&[("bogus", "1")])),
            Err(ListError::UnknownField(field)) if field == "bogus"
        ));
        assert!(matches!(
            build_page_query(&THINGS, &query(&[("sort", "bogus")])),
            Err(ListError::UnknownField(field)) if field == "bogus"
        ));
        assert!(matches!(
            build_page_query(&THINGS, &query(&[("select", "bogus")])),
            Err(ListError::UnknownField(field)) if field == "bogus"
        ));
    }

    #[test]
    fn unparseable_typed_values_are_rejected() {
        assert!(matches!(
            build_page_query(&THINGS, &query(&[("archived", "maybe")])),
            Err(ListError::InvalidValue { field, .. }) if field == "archived"
        ));
        assert!(matches!(
            build_page_query(&THINGS, &query(&[("created_at[lt]", "not-a-date")])),
            Err(ListError::InvalidValue { field, .. }) if field == "created_at"
        ));
        assert!(matches!(
            build_page_query(&THINGS, &query(&[("archived[in]", "true,false")])),
            Err(ListError::UnsupportedOperator(field)) if field == "archived"
        ));
    }

    #[test]
    fn count_query_reuses_the_filter_predicate() {
        let builder = build_count_query(&THINGS, &query(&[("status", "active")])).expect("build");
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM things WHERE status = $1::thingstatus");
    }

    #[test]
    fn timestamp_parsing_accepts_common_shapes() {
        assert!(parse_timestamp("2024-03-05T10:20:30Z").is_some());
        assert!(parse_timestamp("2024-03-05T10:20:30").is_some());
        assert_eq!(
            parse_timestamp("2024-03-05").map(format_primitive),
            Some("2024-03-05T00:00:00Z".to_string())
        );
        assert!(parse_timestamp("yesterday").is_none());
    }
}
