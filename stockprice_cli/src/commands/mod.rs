pub mod init;
pub mod prices;
pub mod run;
