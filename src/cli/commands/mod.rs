pub mod db;
pub mod doc;
pub mod init;
pub mod inv;
pub mod log;
pub mod reg;
pub mod user;
