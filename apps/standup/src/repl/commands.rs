//! Line commands for the sector and session screens.

use shared::{domain::RoundLimit, error::RoundLimitParseError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectorCommand {
    List,
    Start(String),
    AddMember { sector: String, name: String },
    RemoveMember { sector: String, member: usize },
    RenameMember { sector: String, member: usize, name: String },
    Defaults,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Spin,
    Acknowledge,
    Absent(usize),
    Remove(usize),
    Add(String),
    Limit(RoundLimit),
    Note { demands: String, updates: String },
    Icebreaker,
    Queue,
    Reset,
    Summary,
    Back,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a list number")]
    BadNumber(String),
    #[error("limit unchanged: {0}")]
    BadLimit(#[from] RoundLimitParseError),
}

fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

fn required<'a>(rest: &'a str, what: &'static str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument(what))
    } else {
        Ok(rest)
    }
}

/// 1-based list position as typed by the user, returned 0-based.
fn position(raw: &str) -> Result<usize, ParseError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(ParseError::BadNumber(raw.to_string())),
    }
}

pub fn parse_sector_command(line: &str) -> Result<SectorCommand, ParseError> {
    let (head, rest) = split_word(line);
    match head.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "list" | "ls" => Ok(SectorCommand::List),
        "start" | "open" => Ok(SectorCommand::Start(required(rest, "sector")?.to_string())),
        "add" => {
            let (sector, name) = split_word(rest);
            let sector = required(sector, "sector")?;
            let name = required(name, "member name")?;
            Ok(SectorCommand::AddMember {
                sector: sector.to_string(),
                name: name.to_string(),
            })
        }
        "remove" | "rm" => {
            let (sector, member) = split_word(rest);
            let sector = required(sector, "sector")?;
            let member = position(required(member, "member number")?)?;
            Ok(SectorCommand::RemoveMember {
                sector: sector.to_string(),
                member,
            })
        }
        "rename" => {
            let (sector, rest) = split_word(rest);
            let sector = required(sector, "sector")?;
            let (member, name) = split_word(rest);
            let member = position(required(member, "member number")?)?;
            let name = required(name, "new name")?;
            Ok(SectorCommand::RenameMember {
                sector: sector.to_string(),
                member,
                name: name.to_string(),
            })
        }
        "defaults" => Ok(SectorCommand::Defaults),
        "help" | "?" => Ok(SectorCommand::Help),
        "quit" | "exit" | "q" => Ok(SectorCommand::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

pub fn parse_session_command(line: &str) -> Result<SessionCommand, ParseError> {
    let (head, rest) = split_word(line);
    match head.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "spin" | "s" => Ok(SessionCommand::Spin),
        "ok" | "next" | "n" => Ok(SessionCommand::Acknowledge),
        "absent" | "a" => Ok(SessionCommand::Absent(position(required(
            rest,
            "member number",
        )?)?)),
        "remove" | "rm" => Ok(SessionCommand::Remove(position(required(
            rest,
            "member number",
        )?)?)),
        "add" => Ok(SessionCommand::Add(required(rest, "member name")?.to_string())),
        "limit" => Ok(SessionCommand::Limit(
            required(rest, "round limit")?.parse::<RoundLimit>()?,
        )),
        "note" => {
            let body = required(rest, "note text")?;
            let (demands, updates) = match body.split_once('|') {
                Some((demands, updates)) => (demands.trim(), updates.trim()),
                None => ("", body),
            };
            Ok(SessionCommand::Note {
                demands: demands.to_string(),
                updates: updates.to_string(),
            })
        }
        "ice" | "icebreaker" => Ok(SessionCommand::Icebreaker),
        "queue" | "q" => Ok(SessionCommand::Queue),
        "reset" | "new" => Ok(SessionCommand::Reset),
        "summary" => Ok(SessionCommand::Summary),
        "back" => Ok(SessionCommand::Back),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sector_screen_commands() {
        assert_eq!(parse_sector_command("ls"), Ok(SectorCommand::List));
        assert_eq!(
            parse_sector_command("start 2"),
            Ok(SectorCommand::Start("2".into()))
        );
        assert_eq!(
            parse_sector_command("add 3   Maria  Clara "),
            Ok(SectorCommand::AddMember {
                sector: "3".into(),
                name: "Maria  Clara".into()
            })
        );
        assert_eq!(
            parse_sector_command("rm 1 4"),
            Ok(SectorCommand::RemoveMember {
                sector: "1".into(),
                member: 3
            })
        );
        assert_eq!(
            parse_sector_command("rename 1 2 João Pedro"),
            Ok(SectorCommand::RenameMember {
                sector: "1".into(),
                member: 1,
                name: "João Pedro".into()
            })
        );
        assert_eq!(parse_sector_command("QUIT"), Ok(SectorCommand::Quit));
    }

    #[test]
    fn sector_commands_report_missing_pieces() {
        assert_eq!(parse_sector_command("  "), Err(ParseError::Empty));
        assert_eq!(
            parse_sector_command("start"),
            Err(ParseError::MissingArgument("sector"))
        );
        assert_eq!(
            parse_sector_command("add 1"),
            Err(ParseError::MissingArgument("member name"))
        );
        assert_eq!(
            parse_sector_command("rm 1 0"),
            Err(ParseError::BadNumber("0".into()))
        );
        assert_eq!(
            parse_sector_command("dance"),
            Err(ParseError::Unknown("dance".into()))
        );
    }

    #[test]
    fn parses_session_screen_commands() {
        assert_eq!(parse_session_command("spin"), Ok(SessionCommand::Spin));
        assert_eq!(parse_session_command("ok"), Ok(SessionCommand::Acknowledge));
        assert_eq!(parse_session_command("absent 2"), Ok(SessionCommand::Absent(1)));
        assert_eq!(parse_session_command("rm 5"), Ok(SessionCommand::Remove(4)));
        assert_eq!(
            parse_session_command("add  Visitante "),
            Ok(SessionCommand::Add("Visitante".into()))
        );
        assert_eq!(
            parse_session_command("limit 3"),
            Ok(SessionCommand::Limit(RoundLimit::bounded(3).unwrap()))
        );
        assert_eq!(
            parse_session_command("limit todos"),
            Ok(SessionCommand::Limit(RoundLimit::Unbounded))
        );
        assert_eq!(parse_session_command("new"), Ok(SessionCommand::Reset));
    }

    #[test]
    fn invalid_limit_leaves_limit_unchanged() {
        assert!(matches!(
            parse_session_command("limit 0"),
            Err(ParseError::BadLimit(RoundLimitParseError::NotPositive(0)))
        ));
        assert!(matches!(
            parse_session_command("limit many"),
            Err(ParseError::BadLimit(_))
        ));
    }

    #[test]
    fn note_splits_demands_from_updates() {
        assert_eq!(
            parse_session_command("note revisar VPN | ticket fechado"),
            Ok(SessionCommand::Note {
                demands: "revisar VPN".into(),
                updates: "ticket fechado".into()
            })
        );
        assert_eq!(
            parse_session_command("note só novidades"),
            Ok(SessionCommand::Note {
                demands: String::new(),
                updates: "só novidades".into()
            })
        );
    }
}
