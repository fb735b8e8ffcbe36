//! End-to-end tests for the WS-Federation bridge live in `tests/`.
