//! Commands for the wallet initializer.

pub mod init_wallet;
