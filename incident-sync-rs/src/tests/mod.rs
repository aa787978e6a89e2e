//! Unit tests for the incident sync engine
//!
//! One file per concern. HTTP-level behavior is exercised against `wiremock`
//! servers; store behavior against mocked or scripted `IncidentApi`s.


pub mod client_tests;
pub mod mapper_tests;
