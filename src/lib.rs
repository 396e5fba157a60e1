mod app;
mod cli;
mod config_edit;
mod keygen;
mod launch;
mod notes;
mod session_log;
mod sshconfig;

pub use app::App;
pub use cli::{Cli, Commands};
pub use config_edit::{add_identity_file, add_identity_file_to_config};
pub use keygen::{
    generate_key, key_filename, key_paths, locate_public_key, read_public_key,
    resolve_identity_path, GeneratedKey, KeyType, KeygenError, PubKeyError,
};
pub use launch::{find_putty, is_executable_in_path, launch_putty, launch_ssh, LaunchError};
pub use notes::{NoteRecord, NoteStore};
pub use session_log::{ConnectMethod, SessionLog};
pub use sshconfig::*;
