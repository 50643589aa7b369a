// handlers/mod.rs - handlers grouped by access class
//
// public:    no identity required (/, /health, /login, /logout, /api/auth/login)
// protected: behind the access gate (pages redirect, /api rejects)

pub mod protected;
pub mod public;
