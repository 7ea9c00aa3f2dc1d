//! Unit tests for the workflow module.

mod engine_tests;
mod support;
