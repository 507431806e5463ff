use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

pub(crate) const DEFAULT_PAGE: i64 = 1;
pub(crate) const DEFAULT_LIMIT: i64 = 10;

/// Control parameters stripped from the filter predicate.
const RESERVED_PARAMS: &[&str] = &["select", "sort", "page", "limit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn from_suffix(raw: &str) -> Option<Self> {
        match raw {
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    pub(crate) fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            // rendered as `= ANY(...)`, not as a binary operator
            Self::In => "= ANY",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FilterClause {
    pub(crate) field: String,
    pub(crate) op: FilterOp,
    pub(crate) value: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SortKey {
    pub(crate) field: String,
    pub(crate) descending: bool,
}

/// A parsed list request: everything the generic listing engine needs to
/// build one page of results.
#[derive(Debug, Clone)]
pub(crate) struct ListQuery {
    pub(crate) filters: Vec<FilterClause>,
    pub(crate) select: Option<Vec<String>>,
    pub(crate) sort: Option<Vec<SortKey>>,
    pub(crate) page: i64,
    pub(crate) limit: i64,
}

impl ListQuery {
    /// Splits raw query parameters into reserved controls and filter
    /// clauses. Never fails: malformed `page`/`limit` values fall back to
    /// the defaults, and a key with an unrecognized operator suffix is kept
    /// verbatim so the engine can reject it as an unknown field.
    pub(crate) fn from_params(params: &HashMap<String, String>) -> Self {
        let mut filters = Vec::new();

        for (key, value) in params {
            if RESERVED_PARAMS.contains(&key.as_str()) {
                continue;
            }
            filters.push(parse_filter_key(key, value));
        }

        // HashMap iteration order is arbitrary; keep generated SQL stable.
        filters.sort_by(|a, b| a.field.cmp(&b.field).then(a.value.cmp(&b.value)));

        let select = params.get("select").map(|raw| split_fields(raw));
        let sort = params.get("sort").map(|raw| parse_sort(raw));

        let page = parse_positive(params.get("page")).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(params.get("limit")).unwrap_or(DEFAULT_LIMIT);

        Self { filters, select, sort, page, limit }
    }

    pub(crate) fn offset(&self) -> i64 {
        // page and limit come straight from the query string; saturate so
        // absurd values stay a valid (empty) window instead of overflowing.
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Prepends an equality clause the caller mandates regardless of the
    /// incoming parameters (e.g. nested routes scoping by parent id).
    pub(crate) fn with_filter(mut self, field: &str, value: &str) -> Self {
        self.filters.insert(
            0,
            FilterClause {
                field: field.to_string(),
                op: FilterOp::Eq,
                value: value.to_string(),
            },
        );
        self
    }
}

fn parse_filter_key(key: &str, value: &str) -> FilterClause {
    if let Some(open) = key.find('[') {
        if let Some(stripped) = key[open..].strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if let Some(op) = FilterOp::from_suffix(stripped) {
                return FilterClause {
                    field: key[..open].to_string(),
                    op,
                    value: value.to_string(),
                };
            }
        }
    }

    FilterClause { field: key.to_string(), op: FilterOp::Eq, value: value.to_string() }
}

fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',').map(|field| field.trim().to_string()).filter(|field| !field.is_empty()).collect()
}

fn parse_sort(raw: &str) -> Vec<SortKey> {
    split_fields(raw)
        .into_iter()
        .map(|field| match field.strip_prefix('-') {
            Some(rest) => SortKey { field: rest.to_string(), descending: true },
            None => SortKey { field, descending: false },
        })
        .collect()
}

fn parse_positive(raw: Option<&String>) -> Option<i64> {
    raw.and_then(|value| value.parse::<i64>().ok()).filter(|value| *value >= 1)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub(crate) struct PageRef {
    pub(crate) page: i64,
    pub(crate) limit: i64,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub(crate) struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) prev: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) next: Option<PageRef>,
}

impl Pagination {
    pub(crate) fn compute(page: i64, limit: i64, total: i64) -> Self {
        let prev = (page > 1).then_some(PageRef { page: page - 1, limit });
        let next = (page.saturating_mul(limit) < total)
            .then_some(PageRef { page: page.saturating_add(1), limit });
        Self { prev, next }
    }
}

/// Standard response shape for every list endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ListEnvelope {
    pub(crate) success: bool,
    pub(crate) count: usize,
    pub(crate) pagination: Pagination,
    pub(crate) data: Vec<Value>,
}

impl ListEnvelope {
    pub(crate) fn new(query: &ListQuery, total: i64, data: Vec<Value>) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination: Pagination::compute(query.page, query.limit, total),
            data,
        }
    }
}
