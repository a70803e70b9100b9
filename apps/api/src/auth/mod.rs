// Session and role management: the auth collaborator client, the pure role
// resolver, the Redis-backed session store and the login/logout handlers.

pub mod client;
pub mod handlers;
pub mod role;
pub mod session;
