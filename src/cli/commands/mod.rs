//! CLI command implementations.

mod config;
mod doctor;
mod feed_init;
mod list;
mod run;
mod topics;

pub use config::run_config;
pub use doctor::run_doctor;
pub use feed_init::run_feed_init;
pub use list::run_list;
pub use run::run_episode;
pub use topics::run_topics;
