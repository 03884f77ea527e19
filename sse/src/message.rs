use crate::error::Error;
use axum::response::sse::Event;
use events::Id;
use std::fmt;
use std::str::FromStr;

/// Every command a producer is allowed to broadcast. The broker never relays
/// free text, so anything outside this list is rejected at publish time.
pub const ALLOWED_COMMANDS: [Command; 1] = [Command::Update];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Something the client is displaying changed and should be reloaded.
    Update,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Update => "UPDATE",
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(command: &str) -> Result<Self, Self::Err> {
        let upper = command.trim().to_uppercase();
        ALLOWED_COMMANDS
            .iter()
            .copied()
            .find(|allowed| allowed.as_str() == upper)
            .ok_or_else(|| Error::invalid_command(command))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published command together with the optional id of the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub command: Command,
    pub correlation_id: Option<Id>,
}

impl Notice {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(command: Command, correlation_id: Id) -> Self {
        Self {
            command,
            correlation_id: Some(correlation_id),
        }
    }
}

/// Which fields a frame carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadShape {
    /// `{"cmd": "UPDATE"}`
    #[default]
    Command,
    /// `{"cmd": "UPDATE", "id": 7}` whenever the notice has a correlation id.
    CommandWithId,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PayloadShapeParseError;

impl FromStr for PayloadShape {
    type Err = PayloadShapeParseError;

    fn from_str(shape: &str) -> Result<Self, Self::Err> {
        match shape.to_lowercase().as_str() {
            "command" => Ok(PayloadShape::Command),
            "command-with-id" => Ok(PayloadShape::CommandWithId),
            _ => Err(PayloadShapeParseError),
        }
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PayloadShape::Command => write!(f, "command"),
            PayloadShape::CommandWithId => write!(f, "command-with-id"),
        }
    }
}

/// One server-push frame: the JSON body of a single `data:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: String,
}

impl Frame {
    pub fn render(notice: &Notice, shape: PayloadShape) -> Self {
        // Commands come from a closed set of ASCII identifiers, no escaping needed.
        let data = match (shape, notice.correlation_id) {
            (PayloadShape::CommandWithId, Some(id)) => {
                format!("{{\"cmd\": \"{}\", \"id\": {id}}}", notice.command)
            }
            _ => format!("{{\"cmd\": \"{}\"}}", notice.command),
        };
        Self { data }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// The exact bytes written for this frame, blank-line terminated.
    #[cfg(test)]
    pub(crate) fn to_wire(&self) -> String {
        format!("data: {}\n\n", self.data)
    }

    pub fn into_event(self) -> Event {
        Event::default().data(self.data)
    }
}
