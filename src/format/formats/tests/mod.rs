//! Unit tests for interchange format implementations.
//!
//! These tests verify parsing, error classification, and import/export
//! round-trips including coordinate reprojection.
