// Admin roster: versioned in-memory roster, store queries, the realtime
// change feed and the admin-console handlers.

pub mod demo;
pub mod feed;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod roster;
