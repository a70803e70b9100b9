// Company browser: alphabet-bucketed company listing and per-company HR
// contacts, with a fictional demo dataset when the store is unreachable.

pub mod demo;
pub mod handlers;
pub mod models;
pub mod repo;
