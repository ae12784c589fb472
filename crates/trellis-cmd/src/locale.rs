//! Diagnostic message text.
//!
//! Every failure diagnostic the core writes goes through here, so a host
//! that wants different wording has one module to replace.

use trellis_types::output::Output;

pub fn possible_completions(out: &dyn Output) {
    out.println(true, format_args!("possible completions:"));
}

pub fn invalid_command(out: &dyn Output) {
    out.println(true, format_args!("invalid command"));
}

pub fn no_subcommand(out: &dyn Output, cmd: &str) {
    out.println(true, format_args!("no subcommand '{cmd}'"));
}

pub fn did_you_mean(out: &dyn Output) {
    out.println(true, format_args!("did you mean:"));
}

pub fn command_failed(out: &dyn Output, cmd: &str) {
    out.println(true, format_args!("command failed: '{cmd}'"));
}

pub fn subcommands(out: &dyn Output) {
    out.println(true, format_args!("subcommands:"));
}

pub fn usage(out: &dyn Output, path: &str, usage: Option<&str>, desc: Option<&str>) {
    out.println(true, format_args!("usage: {path} {}", usage.unwrap_or("")));
    if let Some(desc) = desc {
        out.println(true, format_args!("desc:  {desc}"));
    }
}

pub fn last_command(out: &dyn Output, cmd: &str) {
    out.println(false, format_args!("> {cmd}"));
}

pub fn num_aliases(out: &dyn Output, num: usize) {
    if num == 0 {
        out.println(true, format_args!("no aliases"));
    } else {
        out.println(true, format_args!("{num} aliases:"));
    }
}

pub fn error(out: &dyn Output, err: &str) {
    out.println(true, format_args!("error: {err}"));
}
