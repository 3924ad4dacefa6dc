pub mod alert;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod event;
pub mod filter;
pub mod init;
pub mod normalize;
pub mod output;
pub mod poller;
pub mod watch;
