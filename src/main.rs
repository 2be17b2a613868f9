//! `hotkey-launcher` - manage and run global hotkeys from the terminal.
//!
//! Every command loads the hotkey file first, so the CLI always operates on
//! what is persisted. `run` registers everything and listens until Enter is
//! pressed or stdin closes.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use hotkey_launcher::config;
use hotkey_launcher::hotkeys::GlobalHotkeyBackend;
use hotkey_launcher::logging;
use hotkey_launcher::notifications::{Level, NotificationSink, TracingSink};
use hotkey_launcher::opener::SystemOpener;
use hotkey_launcher::shortcuts::{
    Combo, HotkeyRegistry, KindSelection, NewHotkey, RegistryOptions,
};

#[derive(Parser, Debug)]
#[command(name = "hotkey-launcher", version, about = "Global hotkeys that open URLs and files")]
struct Cli {
    /// Config file (defaults to ~/.hotkey-launcher/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hotkey file, overriding the config's hotkeysPath
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show configured hotkeys
    List,
    /// Add a hotkey
    Add {
        /// Key combination, e.g. ctrl+alt+g
        combo: String,
        /// URL or file path to open
        target: String,
        #[arg(long, value_enum, default_value_t = KindArg::Auto)]
        kind: KindArg,
    },
    /// Remove a hotkey by list index or combo
    Remove {
        selector: String,
        /// Treat the selector as a combo even if it is a number
        #[arg(long)]
        combo: bool,
    },
    /// Remove every hotkey
    Clear,
    /// Open a hotkey's target now, by list index or combo
    Open {
        selector: String,
        /// Treat the selector as a combo even if it is a number
        #[arg(long)]
        combo: bool,
    },
    /// Register all hotkeys and listen until Enter or EOF
    Run,
}

/// How `remove` and `open` pick an entry.
#[derive(Debug, PartialEq, Eq)]
enum Selector {
    Index(usize),
    Combo(String),
}

impl Selector {
    /// A bare number is a list index unless `force_combo` is set, so a
    /// bare-key combo like `1` can still be addressed.
    fn parse(raw: &str, force_combo: bool) -> Self {
        let raw = raw.trim();
        match raw.parse::<usize>() {
            Ok(index) if !force_combo => Selector::Index(index),
            _ => Selector::Combo(raw.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Auto,
    Url,
    File,
}

impl From<KindArg> for KindSelection {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Auto => KindSelection::Auto,
            KindArg::Url => KindSelection::Url,
            KindArg::File => KindSelection::File,
        }
    }
}

/// Prints every notification as `[level] message` and mirrors it to tracing.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, level: Level, message: &str) {
        TracingSink.notify(level, message);
        match level {
            Level::Error => eprintln!("[{}] {}", level, message),
            _ => println!("[{}] {}", level, message),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("[error] {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but reported a failure the user
/// has already been notified about.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = config::load_config(cli.config.as_deref());
    let mut options = RegistryOptions::from(&config);
    if let Some(store) = cli.store {
        options.store_path = store;
    }

    let backend = Arc::new(GlobalHotkeyBackend::new()?);
    let registry = HotkeyRegistry::new(backend, Arc::new(SystemOpener), Arc::new(ConsoleSink), options);

    let store_path = registry.store_path().to_path_buf();
    if registry.load(&store_path).is_err() {
        return Ok(false);
    }

    let ok = match cli.command {
        Command::List => {
            print_entries(&registry);
            true
        }
        Command::Add {
            combo,
            target,
            kind,
        } => registry
            .add(NewHotkey::new(combo, target, kind.into()))
            .is_ok_and(|report| report.is_clean()),
        Command::Remove { selector, combo } => {
            let result = match Selector::parse(&selector, combo) {
                Selector::Index(index) => registry.remove(index),
                Selector::Combo(combo) => registry.remove_by_combo(&combo),
            };
            result.is_ok_and(|report| report.is_clean())
        }
        Command::Clear => registry.clear().is_ok_and(|report| report.is_clean()),
        Command::Open { selector, combo } => {
            match resolve_index(&registry, Selector::parse(&selector, combo)) {
                Some(index) => registry.open_entry(index).is_ok(),
                None => {
                    eprintln!("[error] No hotkey found for '{}'", selector.trim());
                    false
                }
            }
        }
        Command::Run => listen(&registry)?,
    };
    Ok(ok)
}

fn listen(registry: &HotkeyRegistry) -> anyhow::Result<bool> {
    registry.resync();
    if registry.start().is_err() {
        registry.shutdown();
        return Ok(false);
    }
    println!("Listening for {} hotkey(s). Press Enter to quit.", registry.active_combos().len());

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line);

    registry.shutdown();
    read?;
    Ok(true)
}

fn resolve_index(registry: &HotkeyRegistry, selector: Selector) -> Option<usize> {
    match selector {
        Selector::Index(index) => (index < registry.len()).then_some(index),
        Selector::Combo(combo) => {
            let key = hotkey_launcher::shortcuts::normalize_combo(&combo);
            registry.entries().iter().position(|e| e.combo == key)
        }
    }
}

fn print_entries(registry: &HotkeyRegistry) {
    let entries = registry.entries();
    if entries.is_empty() {
        println!("No hotkeys configured.");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        let shown = Combo::parse(&entry.combo)
            .map(|c| c.display())
            .unwrap_or_else(|_| entry.combo.clone());
        println!("{:>3}  {:<20} {:<5} {}", index, shown, entry.kind.as_str(), entry.target);
    }
}
