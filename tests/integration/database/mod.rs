//! Database integration tests

mod pg_store_test;
