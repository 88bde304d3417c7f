// ABOUTME: Library root for graft - runtime trait composition for sealed host objects.
// ABOUTME: Emulates multiple inheritance with C3 linearization and explicit super dispatch.

pub mod compose;
pub mod def;
pub mod dispatch;
pub mod error;
pub mod factory;
pub mod fallback;
pub mod identity;
pub mod mro;
pub mod target;
pub mod types;
