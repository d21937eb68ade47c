// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// system works with. No burn types, no file I/O.

// Sentiment classes and the raw CSV label set
pub mod sentiment;

// Raw and cleaned tweet records
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
