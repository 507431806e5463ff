pub(crate) mod slugs;
