pub mod edit;
pub mod events;
pub mod init;
pub mod show;
pub mod venues;
