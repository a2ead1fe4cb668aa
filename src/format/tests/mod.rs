//! Unit tests for the text file formats.
//!
//! These tests verify parsing, error reporting and round-trip conversions
//! through the filesystem.

mod samples_tests;
