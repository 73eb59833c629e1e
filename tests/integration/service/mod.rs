//! Board service integration tests

mod access_test;
mod concurrency_test;
