//! End-to-End Integration Tests
//!
//! These tests sign token responses at run time with the fixture keys and
//! push them through the public validation entry points.

mod common;
mod host_adapter;
mod parsing;
mod signatures;
mod validation;
mod wallet;
