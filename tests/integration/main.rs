//! Integration test target

mod crawl_tests;
