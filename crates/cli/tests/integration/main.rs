mod common;
mod validate_tests;
