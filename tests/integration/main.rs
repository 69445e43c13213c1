//! Integration tests for Bookrank
//!
//! These tests use wiremock to serve listing pages and run the whole
//! fetch, parse, rank and report cycle end-to-end.

mod pipeline_tests;
