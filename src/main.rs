use anyhow::{Context, Result};
use clap::Parser;

use sshm::{key_paths, locate_public_key, read_public_key, App, Cli, Commands, SshHostEntry};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let app = App::new()?;

    match cli.command {
        Commands::List => {
            for entry in app.entries() {
                println!("{}", entry.display_line());
            }
        }
        Commands::Show { alias } => {
            let entry = require_entry(&app, &alias)?;
            println!("alias:        {}", entry.alias);
            println!("hostname:     {}", entry.option("hostname"));
            println!("user:         {}", entry.option("user"));
            println!("port:         {}", entry.option("port"));
            println!("identityfile: {}", entry.option("identityfile"));

            let notes = app.notes.load(&entry);
            if !notes.is_empty() {
                println!("\nnotes:\n{notes}");
            }
        }
        Commands::Note { alias } => {
            let entry = require_entry(&app, &alias)?;
            println!("{}", app.notes.load(&entry));
        }
        Commands::SetNote { alias, notes } => {
            let entry = require_entry(&app, &alias)?;
            app.notes.save(&entry, &notes)?;
        }
        Commands::Connect { alias, putty } => {
            let entry = require_entry(&app, &alias)?;
            if putty {
                app.connect_putty(&entry)?;
            } else {
                app.connect_ssh(&entry)?;
            }
        }
        Commands::Keygen {
            key_type,
            name,
            host,
            force,
        } => {
            let entry = host
                .as_deref()
                .map(|alias| require_entry(&app, alias))
                .transpose()?;

            let paths = key_paths(&app.ssh_dir, key_type, &name);
            if paths.private_key.exists() || paths.public_key.exists() {
                if !force {
                    anyhow::bail!(
                        "key {} already exists, pass --force to overwrite",
                        paths.private_key.display()
                    );
                }
                for path in [&paths.private_key, &paths.public_key] {
                    if path.exists() {
                        std::fs::remove_file(path).with_context(|| {
                            format!("failed to remove existing key {}", path.display())
                        })?;
                    }
                }
            }

            let generated = app.generate_key(key_type, &name, entry.as_ref())?;
            println!("private key: {}", generated.private_key.display());
            println!("public key:  {}", generated.public_key.display());
        }
        Commands::Pubkey { alias } => {
            let entry = alias
                .as_deref()
                .map(|alias| require_entry(&app, alias))
                .transpose()?;

            let path = locate_public_key(&app.ssh_dir, entry.as_ref()).with_context(|| {
                format!("no public key found under {}", app.ssh_dir.display())
            })?;
            println!("{}", read_public_key(&path)?);
        }
    }

    Ok(())
}

fn require_entry(app: &App, alias: &str) -> Result<SshHostEntry> {
    app.find_entry(alias).with_context(|| {
        format!(
            "host '{}' not found in {}",
            alias,
            app.config_path.display()
        )
    })
}
