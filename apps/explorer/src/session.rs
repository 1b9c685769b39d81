//! Line commands accepted by `explorer interactive`.

use client_core::PreferenceKey;

pub const HELP: &str = "\
commands:
  fetch <SERIES_ID>   fetch a series and summarize it
  open <CATEGORY>     open a category from the grid
  search [TERM]       filter the open category (empty clears)
  back                return to the category grid
  pick <N>            copy the N-th listed series into the input
  submit              fetch the series in the input
  toggle <KEY>        flip navigator_open, summary_expanded or chart_expanded
  show                redraw everything
  help                this text
  quit                leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Fetch(String),
    Open(String),
    Search(String),
    Back,
    Pick(usize),
    Submit,
    Toggle(PreferenceKey),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "fetch" | "f" => Ok(SessionCommand::Fetch(rest.to_string())),
        "open" | "o" if !rest.is_empty() => Ok(SessionCommand::Open(rest.to_string())),
        "open" | "o" => Err("usage: open <CATEGORY>".into()),
        "search" | "s" => Ok(SessionCommand::Search(rest.to_string())),
        "back" | "b" => Ok(SessionCommand::Back),
        "pick" | "p" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(SessionCommand::Pick)
            .ok_or_else(|| "usage: pick <N> (1-based)".to_string()),
        "submit" => Ok(SessionCommand::Submit),
        "toggle" | "t" => PreferenceKey::parse(rest)
            .map(SessionCommand::Toggle)
            .ok_or_else(|| format!("unknown preference '{rest}'")),
        "show" | "" => Ok(SessionCommand::Show),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}
