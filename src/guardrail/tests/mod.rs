//! Unit tests for the guardrail pipeline.
