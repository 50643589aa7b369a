pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryUserStore;
pub use models::{NewUser, User, UserStatus};
pub use postgres::PgUserStore;
pub use repository::UserStore;
