//! Integration tests for Shelf-Harvest
//!
//! These tests use wiremock to stand in for the retail site and exercise
//! the search, harvest and storage paths end-to-end.

mod common;
mod harvest_tests;
mod search_tests;
mod storage_tests;
