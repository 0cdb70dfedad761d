//! Unit tests for framer modules
//!
//! This module contains cross-module unit tests for the framer components.
//! Tests are organized by module and functionality.

pub mod side_info_tests;
