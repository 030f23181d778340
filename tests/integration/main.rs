//! Integration tests against an in-process mock Wall Connector

mod poll_tests;
mod server_tests;
