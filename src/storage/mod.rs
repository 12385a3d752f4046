pub mod backend;
pub mod connection;
pub mod entities;
pub mod repository;
pub mod seed;


pub use backend::SeaOrmBackend;
pub use connection::{connect, run_migrations};
pub use repository::{NewUser, UserRepository, UserUpdate};
pub use seed::{AdminSeedOutcome, ensure_admin};
