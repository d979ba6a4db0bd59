pub mod error;
pub mod melds;
pub mod messages;
pub mod server;
pub mod tables;
