//! Line grammar of the console.
//!
//! Participant lines start with the acting participant:
//!
//! ```text
//! alice /role top mid        open lottery without top and mid
//! alice /secret_role         instant pick in a private workspace
//! alice /exclude_role        exclusion lottery for alice's voice channel
//! bob pick 2                 pick token 2 (claim is an alias)
//! bob toggle top @100_1      exclude top in session 100_1
//! alice execute              start the draw (draw is an alias)
//! alice myrole
//! ```
//!
//! Operator lines set the scene: `voice <name> <members…>`, `bot <name>`,
//! `state [@session]`, `help` and `quit`.

use thiserror::Error;

use crate::application::coordinator::ActionKind;
use crate::domain::foundation::{ParticipantId, RoleId, SessionId, ValidationError};
use crate::domain::lottery::{PickToken, SessionMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start {
        actor: ParticipantId,
        mode: SessionMode,
        excluded: Option<String>,
    },
    Act {
        actor: ParticipantId,
        session: Option<SessionId>,
        action: ActionKind,
    },
    MyRole {
        actor: ParticipantId,
    },
    State {
        session: Option<SessionId>,
    },
    Voice {
        name: String,
        members: Vec<ParticipantId>,
    },
    Bot(ParticipantId),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("nothing to do")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    UnknownCommand(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a session id like 100_1")]
    BadSession(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub const HELP: &str = "\
participants:  <name> /role [excluded…] | /secret_role [excluded…] | /exclude_role
               <name> pick|claim <n> | toggle|untoggle <role> | execute|draw | cancel [@session]
               <name> myrole
operator:      voice <channel> <members…> | bot <name> | state [@session] | help | quit";

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err(ParseError::Empty);
        };

        match first {
            "help" => return Ok(ConsoleCommand::Help),
            "quit" | "exit" => return Ok(ConsoleCommand::Quit),
            "state" => {
                return Ok(ConsoleCommand::State {
                    session: session_arg(words.next())?,
                })
            }
            "voice" => {
                let name = words.next().ok_or(ParseError::MissingArgument {
                    command: "voice",
                    argument: "a channel name",
                })?;
                let members = words.map(ParticipantId::new).collect::<Result<Vec<_>, _>>()?;
                return Ok(ConsoleCommand::Voice {
                    name: name.to_string(),
                    members,
                });
            }
            "bot" => {
                let name = words.next().ok_or(ParseError::MissingArgument {
                    command: "bot",
                    argument: "a participant name",
                })?;
                return Ok(ConsoleCommand::Bot(ParticipantId::new(name)?));
            }
            _ => {}
        }

        let actor = ParticipantId::new(first)?;
        let verb = words.next().ok_or(ParseError::MissingArgument {
            command: "participant line",
            argument: "a command after the name",
        })?;
        let rest: Vec<&str> = words.collect();

        let start = |mode: SessionMode| -> Result<ConsoleCommand, ParseError> {
            let excluded = (!rest.is_empty()).then(|| rest.join(" "));
            Ok(ConsoleCommand::Start {
                actor: actor.clone(),
                mode,
                excluded,
            })
        };

        match verb {
            "/role" => start(SessionMode::OpenLottery),
            "/secret_role" => start(SessionMode::InstantPick),
            "/exclude_role" => Ok(ConsoleCommand::Start {
                actor,
                mode: SessionMode::ExclusionThenLottery,
                excluded: None,
            }),
            "myrole" | "/myrole" => Ok(ConsoleCommand::MyRole { actor }),
            "pick" | "claim" => {
                let (value, session) = split_session(&rest)?;
                let token = value
                    .ok_or(ParseError::MissingArgument {
                        command: "pick",
                        argument: "a token number",
                    })?
                    .parse::<PickToken>()?;
                act(actor, session, ActionKind::Pick(token))
            }
            "toggle" | "untoggle" => {
                let (value, session) = split_session(&rest)?;
                let role = RoleId::new(value.ok_or(ParseError::MissingArgument {
                    command: "toggle",
                    argument: "a role key",
                })?)?;
                let action = if verb == "toggle" {
                    ActionKind::ToggleAdd(role)
                } else {
                    ActionKind::ToggleRemove(role)
                };
                act(actor, session, action)
            }
            "execute" | "draw" => {
                let (_, session) = split_session(&rest)?;
                act(actor, session, ActionKind::Execute)
            }
            "cancel" => {
                let (_, session) = split_session(&rest)?;
                act(actor, session, ActionKind::Cancel)
            }
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn act(actor: ParticipantId, session: Option<SessionId>, action: ActionKind) -> Result<ConsoleCommand, ParseError> {
    Ok(ConsoleCommand::Act {
        actor,
        session,
        action,
    })
}

/// Separates the optional trailing `@session` from the one positional value.
fn split_session<'a>(rest: &[&'a str]) -> Result<(Option<&'a str>, Option<SessionId>), ParseError> {
    let mut value = None;
    let mut session = None;
    for word in rest {
        if word.starts_with('@') {
            session = session_arg(Some(*word))?;
        } else if value.is_none() {
            value = Some(*word);
        }
    }
    Ok((value, session))
}

fn session_arg(word: Option<&str>) -> Result<Option<SessionId>, ParseError> {
    match word {
        None => Ok(None),
        Some(word) => {
            let raw = word.trim_start_matches('@');
            raw.parse::<SessionId>()
                .map(Some)
                .map_err(|_| ParseError::BadSession(raw.to_string()))
        }
    }
}
