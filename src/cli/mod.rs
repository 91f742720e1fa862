//! Command-line interface components
//!
//! This module contains CLI-specific code for the drive_pusher application,
//! including argument parsing and command handlers.

pub mod args;
pub mod commands;

pub use args::{
    AuthAction, AuthArgs, Cli, Commands, CreateArgs, DownloadArgs, GetArgs, GlobalArgs, ListArgs,
    PushArgs,
};
pub use commands::{
    handle_auth, handle_create, handle_download, handle_get, handle_list, handle_push,
};
