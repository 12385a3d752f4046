pub mod server;
pub mod shutdown;
pub mod startup;

pub use server::run_server;
pub use shutdown::listen_for_shutdown;
pub use startup::{StartupContext, prepare_server};
