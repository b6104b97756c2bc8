// handlers/mod.rs - two security tiers
//
// Public (no auth): service info and health
// Protected (bearer JWT): owner-scoped /todoitems
pub mod protected;
pub mod public;
