// handlers/mod.rs - HTTP handlers
//
// Two tiers:
// views   (read-only, no secret) -> GET routes
// actions (privileged, gated)    -> POST/DELETE routes

pub mod actions;
pub mod views;
