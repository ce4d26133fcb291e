//! Unit tests for the job context.

mod domain_tests;
