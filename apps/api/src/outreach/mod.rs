// Outreach generation: LinkedIn notes, cold emails, HR emails.
// All three features share the same shape: validate required fields, call the
// generation proxy through proxy::GenerationClient, return the trimmed text.
// Only the HR email feature has a deterministic local fallback.

pub mod compose;
pub mod fallback;
pub mod handlers;
pub mod proxy;
pub mod request;
