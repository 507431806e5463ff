use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod auth;
pub(crate) mod customer;
pub(crate) mod project;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) docs_url: String,
}

/// Single-resource response shape shared by the CRUD endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct DataEnvelope<T: Serialize> {
    pub(crate) success: bool,
    pub(crate) data: T,
}

impl<T: Serialize> DataEnvelope<T> {
    pub(crate) fn new(data: T) -> Self {
        Self { success: true, data }
    }
}
