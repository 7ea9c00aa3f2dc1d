//! Unit tests for intent classification.
