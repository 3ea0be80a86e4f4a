//! Line commands typed at the prompt.
use std::fmt;

use verifier_core::{FieldId, Msg};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Core messages to dispatch in order.
    Form(Vec<Msg>),
    Show,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand(String),
    UnknownField(String),
    MissingField(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "no command"),
            ParseError::UnknownCommand(cmd) => write!(f, "unknown command {cmd:?}; try \"help\""),
            ParseError::UnknownField(name) => write!(f, "unknown field {name:?}"),
            ParseError::MissingField(cmd) => write!(f, "\"{cmd}\" needs a field name"),
        }
    }
}

pub const HELP: &[&str] = &[
    "set <feld> <wert>    Wert eingeben und Feld verlassen",
    "type <feld> <wert>   Wert eingeben, Feld bleibt aktiv",
    "blur <feld>          Feld verlassen",
    "clear <feld>         Feld leeren",
    "submit               Prüfung starten",
    "show                 Formular anzeigen",
    "history              Letzte Prüfungen",
    "quit                 Beenden",
];

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(command, rest)| (command, rest.trim_start()))
        .unwrap_or((line, ""));

    match command.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "set" => {
            let (field, value) = field_and_value(rest, "set")?;
            Ok(Command::Form(vec![
                Msg::FieldInput { field, value },
                Msg::FieldCommitted(field),
            ]))
        }
        "type" => {
            let (field, value) = field_and_value(rest, "type")?;
            Ok(Command::Form(vec![Msg::FieldInput { field, value }]))
        }
        "clear" => {
            let (field, _) = field_and_value(rest, "clear")?;
            Ok(Command::Form(vec![
                Msg::FieldInput {
                    field,
                    value: String::new(),
                },
                Msg::FieldCommitted(field),
            ]))
        }
        "blur" => {
            let (field, _) = field_and_value(rest, "blur")?;
            Ok(Command::Form(vec![Msg::FieldCommitted(field)]))
        }
        "submit" => Ok(Command::Form(vec![Msg::SubmitClicked])),
        "show" => Ok(Command::Show),
        "history" => Ok(Command::History),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn field_and_value(rest: &str, command: &'static str) -> Result<(FieldId, String), ParseError> {
    let (name, value) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    if name.is_empty() {
        return Err(ParseError::MissingField(command));
    }
    let field = FieldId::from_name(name).ok_or_else(|| ParseError::UnknownField(name.to_string()))?;
    Ok((field, value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_types_then_commits() {
        assert_eq!(
            parse("set counterparty_vat  DE 123"),
            Ok(Command::Form(vec![
                Msg::FieldInput {
                    field: FieldId::CounterpartyVat,
                    value: "DE 123".to_string(),
                },
                Msg::FieldCommitted(FieldId::CounterpartyVat),
            ]))
        );
    }

    #[test]
    fn errors_name_the_problem() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("blur"), Err(ParseError::MissingField("blur")));
        assert_eq!(
            parse("set vat DE1"),
            Err(ParseError::UnknownField("vat".to_string()))
        );
        assert_eq!(
            parse("frobnicate"),
            Err(ParseError::UnknownCommand("frobnicate".to_string()))
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("SUBMIT"), Ok(Command::Form(vec![Msg::SubmitClicked])));
        assert_eq!(parse("history"), Ok(Command::History));
        assert_eq!(parse("exit"), Ok(Command::Quit));
    }
}
