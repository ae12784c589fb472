//! Interactive front-end for the trellis command interpreter.
//!
//! Reads statements from stdin, dispatches them through a demo service
//! supervisor tree, and prints results to stdout. An optional TOML config
//! (path from argv[1] or `TRELLIS_CONFIG`) seeds aliases and identifiers.

mod config;
mod demo;
mod output;

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;

use config::ReplConfig;
use demo::ReplState;
use output::StdioOutput;
use trellis_cmd::Dispatcher;
use trellis_types::output::Output;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Resolve config from CLI arg, TRELLIS_CONFIG env var, or run bare.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TRELLIS_CONFIG").ok())
        .map(PathBuf::from);
    let config = match &config_path {
        Some(path) => config::load_config(path)?,
        None => ReplConfig::default(),
    };

    let state = Rc::new(RefCell::new(ReplState::default()));
    let mut dispatcher = Dispatcher::new(Rc::clone(&state));
    demo::register_demo(&mut dispatcher)?;
    config::apply(&config, &dispatcher);
    log::info!("trellis repl ready ({} aliases)", dispatcher.aliases().len());

    let out = StdioOutput::new();
    out.println(false, format_args!("trellis repl -- end a command with ? for usage, quit to exit"));

    let stdin = io::stdin();
    loop {
        print!("{}", config.prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        dispatcher.execute(line.trim_end_matches(['\n', '\r']), &out);
        if state.borrow().quit {
            break;
        }
    }
    Ok(())
}
