//! Unit tests for the catalog bounded context.

mod service_tests;
