use anyhow::{Context, Result};
use argh::FromArgs;
use cmdshell::{Outcome, Registry, RegistrationError, Shell, ShellConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Interactive key/value scratchpad built on cmdshell.
struct Args {
    #[argh(option, short = 'c')]
    /// path to a TOML config file.
    config: Option<PathBuf>,

    #[argh(option)]
    /// prompt to show, overrides the config file.
    prompt: Option<String>,

    #[argh(option, short = 'e')]
    /// execute a single line and exit instead of starting the shell.
    exec: Option<String>,
}

type Store = Arc<Mutex<BTreeMap<String, String>>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(argh::from_env()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ShellConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ShellConfig::default(),
    };
    if let Some(prompt) = args.prompt {
        config.prompt = prompt;
    }

    let mut registry = Registry::new();
    register_commands(&mut registry, Store::default())?;
    let mut shell = Shell::new(registry, config);

    match args.exec {
        Some(line) => match shell.execute(&line)? {
            Outcome::Help(text) => println!("{text}"),
            Outcome::Idle | Outcome::Dispatched | Outcome::Quit => {}
        },
        None => shell.repl()?,
    }
    Ok(())
}

fn register_commands(registry: &mut Registry, store: Store) -> Result<(), RegistrationError> {
    registry
        .command("", "", "", |inv| {
            if inv.boolean("v")? {
                println!("{}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        })?
        .bool_flag("v", "version", "prints the version", false)?;

    let set_store = Arc::clone(&store);
    registry
        .command("set", "stores a value", "Stores a value under a key.", move |inv| {
            let key = inv.string("k")?.unwrap_or_default();
            let value = inv.string("v")?.unwrap_or_default();
            set_store
                .lock()
                .map_err(|_| anyhow::anyhow!("store poisoned"))?
                .insert(key, value);
            Ok(())
        })?
        .string_flag("k", "key", "", "key to set", true)?
        .string_flag("v", "value", "", "value to store, may span several words", true)?;

    let get_store = Arc::clone(&store);
    registry
        .command("get", "prints a value", "Prints the value stored under a key.", move |inv| {
            let key = inv.string("k")?.unwrap_or_default();
            let store = get_store
                .lock()
                .map_err(|_| anyhow::anyhow!("store poisoned"))?;
            let value = store
                .get(&key)
                .with_context(|| format!("no value for key '{key}'"))?;
            let times = inv.int("n")?.unwrap_or(1).max(0);
            for _ in 0..times {
                println!("{value}");
            }
            Ok(())
        })?
        .string_flag("k", "key", "", "key to read", true)?
        .int_flag("n", "times", 1, "how many times to print the value", false)?;

    let del_store = Arc::clone(&store);
    registry
        .command("del", "removes a value", "Removes the value stored under a key.", move |inv| {
            let key = inv.string("k")?.unwrap_or_default();
            let removed = del_store
                .lock()
                .map_err(|_| anyhow::anyhow!("store poisoned"))?
                .remove(&key);
            anyhow::ensure!(removed.is_some(), "no value for key '{key}'");
            Ok(())
        })?
        .string_flag("k", "key", "", "key to remove", true)?;

    registry
        .command("list", "lists keys", "Lists stored keys, optionally with values.", move |inv| {
            let long = inv.boolean("l")?;
            let store = store.lock().map_err(|_| anyhow::anyhow!("store poisoned"))?;
            for (key, value) in store.iter() {
                if long {
                    println!("{key}\t{value}");
                } else {
                    println!("{key}");
                }
            }
            Ok(())
        })?
        .bool_flag("l", "long", "show values too", false)?;

    Ok(())
}
