//! Edit script parsing
//!
//! One command per line:
//!
//! ```text
//! A1 5
//! B1 =A1+1
//! C1 'escaped text
//! clear A1
//! ```
//!
//! A set command is an address followed by the cell text, which is everything
//! after the first run of whitespace and may be empty. Blank lines are skipped.

use anyhow::{bail, Context, Result};
use cellgraph::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { pos: Position, text: String },
    Clear { pos: Position },
}

/// Parse one script line; `None` for blank lines
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let line = line.trim_start();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim_start()),
        None => (line, ""),
    };

    if head == "clear" {
        let address = rest.trim();
        if address.is_empty() {
            bail!("'clear' needs a cell address");
        }
        let pos = parse_address(address)?;
        return Ok(Some(Command::Clear { pos }));
    }

    let pos = parse_address(head)?;
    Ok(Some(Command::Set {
        pos,
        text: rest.to_string(),
    }))
}

fn parse_address(address: &str) -> Result<Position> {
    Position::parse(address).with_context(|| format!("Invalid cell address '{}'", address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(address: &str, text: &str) -> Option<Command> {
        Some(Command::Set {
            pos: Position::parse(address).unwrap(),
            text: text.to_string(),
        })
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(parse_line("A1 5").unwrap(), set("A1", "5"));
        assert_eq!(parse_line("B2   =A1 + 1\n").unwrap(), set("B2", "=A1 + 1"));
        assert_eq!(parse_line("C3\t'quoted text ").unwrap(), set("C3", "'quoted text "));
        assert_eq!(parse_line("D4").unwrap(), set("D4", ""));
    }

    #[test]
    fn test_parse_clear() {
        assert_eq!(
            parse_line("clear A1").unwrap(),
            Some(Command::Clear {
                pos: Position::new(0, 0)
            })
        );
        assert!(parse_line("clear").is_err());
        assert!(parse_line("clear 12").is_err());
    }

    #[test]
    fn test_parse_blank_and_invalid() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   \r\n").unwrap(), None);
        assert!(parse_line("a1 5").is_err());
        assert!(parse_line("A0 5").is_err());
    }
}
