// Kernel: process-wide dependencies and external-service contracts

pub mod bootstrap;
pub mod deadline;
pub mod deps;
pub mod testing;
pub mod traits;

pub use bootstrap::{connect_pool, init_tracing, run_migrations, Config};
pub use deadline::with_deadline;
pub use deps::ServerDeps;
pub use traits::BlobStore;
