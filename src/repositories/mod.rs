pub(crate) mod customers;
pub(crate) mod list;
pub(crate) mod projects;
pub(crate) mod users;
