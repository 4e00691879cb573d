//! Terminal command parsing

use numberplay_core::RegisterRequest;

pub const HELP: &str = "\
Commands:
  login <email> <password>
  register <username> <email> <password> <confirm>
  play <number>          play a number between 1 and 9999
  results                live results pushed by the server
  history [page]         past games, 10 per page
  stats                  your statistics
  status                 session and connection state
  logout
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { email: String, password: String },
    Register(RegisterRequest),
    Play(String),
    Results,
    History(usize),
    Stats,
    Status,
    Logout,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("login", _) => return Err("usage: login <email> <password>".to_string()),
            ("register", [username, email, password, confirm]) => {
                Command::Register(RegisterRequest {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    password_confirm: confirm.to_string(),
                })
            }
            ("register", _) => {
                return Err("usage: register <username> <email> <password> <confirm>".to_string())
            }
            // Validation happens in the play view, so pass the text through
            ("play", [number]) => Command::Play(number.to_string()),
            ("play", []) => Command::Play(String::new()),
            ("play", _) => return Err("usage: play <number>".to_string()),
            ("results", []) => Command::Results,
            ("history", []) => Command::History(1),
            ("history", [page]) => match page.parse::<usize>() {
                Ok(page) if page > 0 => Command::History(page),
                _ => return Err("usage: history [page]".to_string()),
            },
            ("stats", []) => Command::Stats,
            ("status", []) => Command::Status,
            ("logout", []) => Command::Logout,
            ("help", _) | ("?", _) => Command::Help,
            ("quit", _) | ("exit", _) => Command::Quit,
            (other, _) => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("login a@b.c pw").unwrap(),
            Some(Command::Login {
                email: "a@b.c".to_string(),
                password: "pw".to_string()
            })
        );
        assert_eq!(
            Command::parse("PLAY 42").unwrap(),
            Some(Command::Play("42".to_string()))
        );
        assert_eq!(Command::parse("history").unwrap(), Some(Command::History(1)));
        assert_eq!(Command::parse("history 3").unwrap(), Some(Command::History(3)));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_play_text_is_not_validated_here() {
        assert_eq!(
            Command::parse("play abc").unwrap(),
            Some(Command::Play("abc".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("login only-email").is_err());
        assert!(Command::parse("history 0").is_err());
        assert!(Command::parse("history x").is_err());
        assert!(Command::parse("register a b c").is_err());
        assert!(Command::parse("dance").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn test_parse_register() {
        let Some(Command::Register(request)) =
            Command::parse("register bob b@x.io pw pw").unwrap()
        else {
            panic!("expected register");
        };
        assert_eq!(request.username, "bob");
        assert_eq!(request.email, "b@x.io");
        assert_eq!(request.password_confirm, "pw");
    }
}
