pub mod accounts;
pub mod config;
pub mod init;
pub mod version;

pub use accounts::Accounts;
pub use config::Config;
pub use init::Init;
pub use version::Version;
