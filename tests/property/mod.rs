//! Property-based tests for stage tracker invariants
