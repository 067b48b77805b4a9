// Account handling: registration/login handlers, Argon2 password hashing,
// JWT issuing and the bearer-token middleware guarding protected routes.

pub mod handlers;
pub mod middleware;
pub mod passwords;
pub mod tokens;
