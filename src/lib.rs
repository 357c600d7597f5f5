pub mod api;
pub mod config;
pub mod connect;
pub mod db;
pub mod fighter;
pub mod metrics;

pub use config::Config;
pub use connect::{ConnectEngine, ConnectError, FighterId};
pub use fighter::FighterProfile;
