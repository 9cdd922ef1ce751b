// Test modules for llm-routing crate
//
// Test organization follows the template pattern where each source file
// has a corresponding test file that focuses on business logic verification.

// Test helper utilities (stub data sources instead of monkey-patching)
pub mod helpers;

// Core unit tests (template compliant)
pub mod cache;
