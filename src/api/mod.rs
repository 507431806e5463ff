pub(crate) mod auth;
pub(crate) mod customers;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod list_query;
pub(crate) mod projects;
pub(crate) mod router;
pub(crate) mod users;
