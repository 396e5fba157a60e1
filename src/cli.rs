use clap::{Parser, Subcommand};

use crate::keygen::KeyType;

#[derive(Parser, Debug)]
#[command(
    name = "sshm",
    version,
    about = "Manage SSH hosts, notes and keys from ~/.ssh/config",
    after_help = "EXAMPLES:\n  List hosts:                sshm list\n  Show one host with notes:  sshm show web\n  Save a note:               sshm set-note web 'reboot fridays'\n  Open a session:            sshm connect web\n  Generate a key for a host: sshm keygen --key-type ed25519 --name work --host web"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all hosts from the SSH config
    List,

    /// Show details and notes for one host
    Show { alias: String },

    /// Print the stored notes for a host
    Note { alias: String },

    /// Replace the stored notes for a host
    SetNote { alias: String, notes: String },

    /// Open an SSH session to a host in a new terminal window
    Connect {
        alias: String,
        /// Launch PuTTY instead of the native ssh client
        #[arg(long)]
        putty: bool,
    },

    /// Generate a key pair with ssh-keygen
    Keygen {
        #[arg(long, value_enum, default_value_t = KeyType::Ed25519)]
        key_type: KeyType,

        /// Optional key name suffix, e.g. 'work' for id_ed25519_work
        #[arg(long, default_value = "")]
        name: String,

        /// Insert the generated key as IdentityFile into this host's block
        #[arg(long)]
        host: Option<String>,

        /// Overwrite an existing key pair of the same name
        #[arg(long)]
        force: bool,
    },

    /// Print a public key (a host's IdentityFile, or the default keys)
    Pubkey { alias: Option<String> },
}
