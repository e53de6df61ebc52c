//! Line commands of the interactive session.

use std::str::FromStr;

use crate::domain::NodeId;

/// One line typed into `forestviz play`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    Add,
    Remove,
    Reset,
    Auto,
    Stop,
    Select(NodeId),
    Toggle(NodeId),
    Clear,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
add           grow the forest by one leaf
remove        shrink the forest by one leaf
reset         empty the forest
auto          run the auto-sequence 1, 2, ... leaves
stop          stop the auto-sequence
select <id>   show details of a node, e.g. leaf-0 or node-2
toggle <id>   select the node, or clear it if already selected
clear         clear the selection
show          print the forest, stats and selection
help          print this text
quit          leave the session";

impl FromStr for PlayCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| "empty command".to_string())?;
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for '{verb}'"));
        }

        let node = |arg: Option<&str>| -> Result<NodeId, String> {
            arg.ok_or_else(|| format!("'{verb}' needs a node id"))?
                .parse::<NodeId>()
                .map_err(|e| e.to_string())
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" | "+" => PlayCommand::Add,
            "remove" | "-" => PlayCommand::Remove,
            "reset" => PlayCommand::Reset,
            "auto" => PlayCommand::Auto,
            "stop" => PlayCommand::Stop,
            "select" => return node(arg).map(PlayCommand::Select),
            "toggle" => return node(arg).map(PlayCommand::Toggle),
            "clear" => PlayCommand::Clear,
            "show" => PlayCommand::Show,
            "help" | "?" => PlayCommand::Help,
            "quit" | "exit" | "q" => PlayCommand::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        match arg {
            Some(extra) => Err(format!("'{verb}' takes no argument, got '{extra}'")),
            None => Ok(command),
        }
    }
}
