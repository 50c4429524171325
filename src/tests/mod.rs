// Test modules for foundry-responses crate
//
// Each source module has a corresponding test file that focuses on
// business logic verification. HTTP-level behaviour lives in the
// integration tests under tests/.

// Test helper utilities
pub mod helpers;

pub mod logging;
pub mod report;
