//! Unit tests for the workspace bounded context.

mod directory_tests;
