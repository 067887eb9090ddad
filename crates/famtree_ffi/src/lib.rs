//! Flutter-facing FFI surface for FamTree core.

pub mod api;
