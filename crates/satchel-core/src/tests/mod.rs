// Crate-level test suites
mod integration;
