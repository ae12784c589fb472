//! Demo command tree: a small service supervisor.
//!
//! Exercises the interpreter surface end to end: nested commands, flags,
//! pairs, numeric arguments, usage text, aliases, history, and identifier
//! substitution.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use trellis_cmd::{Command, Dispatcher, NodeRef, Token, TokenStream, locale};
use trellis_types::error::Result;
use trellis_types::output::{IndentGuard, Output, OutputGuard};

/// Shared repl state, handed to every command as its baton.
pub type State = Rc<RefCell<ReplState>>;

#[derive(Debug, Default)]
pub struct ReplState {
    pub services: BTreeMap<String, ServiceStatus>,
    pub quit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Running => f.write_str("running"),
            ServiceStatus::Stopped => f.write_str("stopped"),
        }
    }
}

/// Build the demo tree on `dispatcher`.
pub fn register_demo(dispatcher: &mut Dispatcher<State>) -> Result<()> {
    let service = dispatcher.add_group(None, "service")?;

    let start = dispatcher.add_command(Some(service), "start", StartCmd)?;
    dispatcher.set_usage(start, "<name> [-priority <n>]")?;
    dispatcher.set_description(start, "Start a managed service")?;

    let stop = dispatcher.add_command(Some(service), "stop", StopCmd)?;
    dispatcher.set_usage(stop, "<name> [-force]")?;
    dispatcher.set_description(stop, "Stop a managed service")?;

    let status = dispatcher.add_command(Some(service), "status", StatusCmd)?;
    dispatcher.set_description(status, "Show service states")?;

    let echo = dispatcher.add_command(None, "echo", EchoCmd)?;
    dispatcher.set_usage(echo, "[words...]")?;

    dispatcher.add_command(None, "history", HistoryCmd)?;
    dispatcher.add_command(None, "alias", AliasCmd)?;

    let ident = dispatcher.add_command(None, "ident", IdentCmd)?;
    dispatcher.set_usage(ident, "[<name> <value>]")?;
    dispatcher.set_description(ident, "Set or list $name substitutions")?;

    dispatcher.add_command(None, "quit", QuitCmd)?;

    dispatcher.alias_add(status, "st")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// service start
// ---------------------------------------------------------------------------

struct StartCmd;
impl Command<State> for StartCmd {
    fn on_execute(
        &self,
        node: NodeRef<'_, State>,
        tokens: &mut TokenStream,
        out: &dyn Output,
    ) -> bool {
        let Some(name) = tokens.pop_str() else {
            locale::error(out, "expected a service name");
            return false;
        };
        let priority = match tokens.pair("-priority") {
            Some(token) => match token.as_i64() {
                Some(priority) => Some(priority),
                None => {
                    locale::error(out, &format!("bad priority '{token}'"));
                    return false;
                },
            },
            None => None,
        };
        node.user()
            .borrow_mut()
            .services
            .insert(name.clone(), ServiceStatus::Running);
        match priority {
            Some(priority) => {
                out.println(true, format_args!("started '{name}' (priority {priority})"));
            },
            None => out.println(true, format_args!("started '{name}'")),
        }
        true
    }
}

// ---------------------------------------------------------------------------
// service stop
// ---------------------------------------------------------------------------

struct StopCmd;
impl Command<State> for StopCmd {
    fn on_execute(
        &self,
        node: NodeRef<'_, State>,
        tokens: &mut TokenStream,
        out: &dyn Output,
    ) -> bool {
        let Some(name) = tokens.pop_str() else {
            locale::error(out, "expected a service name");
            return false;
        };
        let mut state = node.user().borrow_mut();
        match state.services.get_mut(&name) {
            Some(status) => {
                *status = ServiceStatus::Stopped;
                out.println(true, format_args!("stopped '{name}'"));
                true
            },
            None if tokens.has_flag("-force") => {
                out.println(true, format_args!("'{name}' was not running"));
                true
            },
            None => {
                locale::error(out, &format!("unknown service '{name}'"));
                false
            },
        }
    }
}

// ---------------------------------------------------------------------------
// service status
// ---------------------------------------------------------------------------

struct StatusCmd;
impl Command<State> for StatusCmd {
    fn on_execute(
        &self,
        node: NodeRef<'_, State>,
        _tokens: &mut TokenStream,
        out: &dyn Output,
    ) -> bool {
        let state = node.user().borrow();
        let _guard = OutputGuard::new(out);
        if state.services.is_empty() {
            out.println(true, format_args!("no services"));
            return true;
        }
        out.println(true, format_args!("services:"));
        let _indent = IndentGuard::new(out, 2);
        for (name, status) in &state.services {
            out.println(true, format_args!("{name:<12} {status}"));
        }
        true
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command<State> for EchoCmd {
    fn on_execute(
        &self,
        _node: NodeRef<'_, State>,
        tokens: &mut TokenStream,
        out: &dyn Output,
    ) -> bool {
        let words: Vec<&str> = tokens.positional().iter().map(Token::as_str).collect();
        out.println(true, format_args!("{}", words.join(" ")));
        true
    }
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

struct HistoryCmd;
impl Command<State> for HistoryCmd {
    fn on_execute(
        &self,
        node: NodeRef<'_, State>,
        _tokens: &mut TokenStream,
        out: &dyn Output,
    ) -> bool {
        let _guard = OutputGuard::new(out);
        for (i, entry) in node.dispatcher().history().iter().enumerate() {
            out.println(true, format_args!("{:4}  {entry}", i + 1));
        }
        true
    }
}

// ---------------------------------------------------------------------------
// alias
// ---------------------------------------------------------------------------

struct AliasCmd;
impl Command<State> for AliasCmd {
    fn on_execute(
        &self,
        node: NodeRef<'_, State>,
        _tokens: &mut TokenStream,
        out: &dyn Output,
    ) -> bool {
        let dispatcher = node.dispatcher();
        let aliases = dispatcher.aliases();
        let _guard = OutputGuard::new(out);
        locale::num_aliases(out, aliases.len());
        let _indent = IndentGuard::new(out, 2);
        for (name, id) in aliases {
            if let Some(target) = dispatcher.node(id) {
                out.println(true, format_args!("{name} -> {}", target.command_path()));
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// ident
// ---------------------------------------------------------------------------

struct IdentCmd;
impl Command<State> for IdentCmd {
    fn on_execute(
        &self,
        node: NodeRef<'_, State>,
        tokens: &mut TokenStream,
        out: &dyn Output,
    ) -> bool {
        let dispatcher = node.dispatcher();
        let Some(name) = tokens.pop_str() else {
            let mut idents: Vec<(String, u64)> = dispatcher.idents().into_iter().collect();
            idents.sort_by(|a, b| a.0.cmp(&b.0));
            let _guard = OutputGuard::new(out);
            for (name, value) in idents {
                out.println(true, format_args!("${name} = {value}"));
            }
            return true;
        };
        let Some(token) = tokens.pop() else {
            locale::error(out, "expected a value");
            return false;
        };
        let Some(value) = token.as_u64() else {
            locale::error(out, &format!("bad value '{token}'"));
            return false;
        };
        dispatcher.ident_set(&name, value);
        out.println(true, format_args!("${name} = {value}"));
        true
    }
}

// ---------------------------------------------------------------------------
// quit
// ---------------------------------------------------------------------------

struct QuitCmd;
impl Command<State> for QuitCmd {
    fn on_execute(
        &self,
        node: NodeRef<'_, State>,
        _tokens: &mut TokenStream,
        _out: &dyn Output,
    ) -> bool {
        node.user().borrow_mut().quit = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_types::output::BufferOutput;

    fn make_repl() -> (Dispatcher<State>, State) {
        let state = Rc::new(RefCell::new(ReplState::default()));
        let mut dispatcher = Dispatcher::new(Rc::clone(&state));
        register_demo(&mut dispatcher).unwrap();
        (dispatcher, state)
    }

    #[test]
    fn start_and_status() {
        let (dispatcher, state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("service start web", &out));
        assert_eq!(
            state.borrow().services.get("web"),
            Some(&ServiceStatus::Running)
        );
        out.clear();
        assert!(dispatcher.execute("service status", &out));
        let text = out.text();
        assert!(text.contains("web"));
        assert!(text.contains("running"));
    }

    #[test]
    fn abbreviated_path_resolves() {
        let (dispatcher, state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("ser star db", &out));
        assert!(state.borrow().services.contains_key("db"));
    }

    #[test]
    fn status_alias_bypasses_walk() {
        let (dispatcher, _state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("st", &out));
        assert!(out.text().contains("no services"));
    }

    #[test]
    fn stop_unknown_service_fails_without_force() {
        let (dispatcher, _state) = make_repl();
        let out = BufferOutput::new();
        assert!(!dispatcher.execute("service stop web", &out));
        assert!(out.text().contains("unknown service 'web'"));
        out.clear();
        assert!(dispatcher.execute("service stop web -force", &out));
        assert!(out.text().contains("'web' was not running"));
    }

    #[test]
    fn bad_priority_is_the_commands_own_failure() {
        let (dispatcher, _state) = make_repl();
        let out = BufferOutput::new();
        assert!(!dispatcher.execute("service start web -priority soon", &out));
        assert!(out.text().contains("bad priority 'soon'"));
    }

    #[test]
    fn priority_accepts_hex() {
        let (dispatcher, _state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("service start web -priority 0x1F", &out));
        assert!(out.text().contains("priority 31"));
    }

    #[test]
    fn ident_set_then_substitute() {
        let (dispatcher, state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("ident web 7", &out));
        assert!(dispatcher.execute("service start $web", &out));
        assert!(state.borrow().services.contains_key("7"));
    }

    #[test]
    fn quit_sets_the_flag() {
        let (dispatcher, state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("quit", &out));
        assert!(state.borrow().quit);
    }

    #[test]
    fn usage_query_on_nested_command() {
        let (dispatcher, _state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("service start ?", &out));
        let text = out.text();
        assert!(text.contains("usage: service start <name> [-priority <n>]"));
        assert!(text.contains("desc:  Start a managed service"));
    }

    #[test]
    fn alias_listing_shows_target_path() {
        let (dispatcher, _state) = make_repl();
        let out = BufferOutput::new();
        assert!(dispatcher.execute("alias", &out));
        let text = out.text();
        assert!(text.contains("1 aliases:"));
        assert!(text.contains("st -> service status"));
    }
}
