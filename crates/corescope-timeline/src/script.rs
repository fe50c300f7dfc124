//! Edit scripts: a line-oriented list of timeline operations.
//!
//! ```text
//! # build a triangle, then branch
//! add 1 2
//! add 2 3
//! add 3 1
//! goto 2
//! remove 1 2
//! ```

use thiserror::Error;

use crate::error::TimelineError;
use crate::revision::{Action, RevisionId};
use crate::timeline::Timeline;
use corescope_core::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCommand {
    Change {
        action: Action,
        source: NodeId,
        target: NodeId,
    },
    Goto(RevisionId),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: cannot parse {content:?}")]
    Parse { line: usize, content: String },

    #[error("line {line}: {source}")]
    Timeline {
        line: usize,
        #[source]
        source: TimelineError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    commands: Vec<(usize, ScriptCommand)>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let mut commands = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let command = parse_command(line).ok_or_else(|| ScriptError::Parse {
                line: i + 1,
                content: line.to_string(),
            })?;
            commands.push((i + 1, command));
        }
        Ok(Script { commands })
    }

    pub fn commands(&self) -> impl Iterator<Item = &ScriptCommand> {
        self.commands.iter().map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run every command against `timeline`, stopping at the first failure.
    pub fn replay(&self, timeline: &mut Timeline) -> Result<(), ScriptError> {
        for &(line, command) in &self.commands {
            let outcome = match command {
                ScriptCommand::Change {
                    action,
                    source,
                    target,
                } => timeline.add_change(action, source, target).map(|_| ()),
                ScriptCommand::Goto(id) => timeline.navigate(id).map(|_| ()),
            };
            outcome.map_err(|source| ScriptError::Timeline { line, source })?;
        }
        tracing::debug!("Replayed {} command(s)", self.commands.len());
        Ok(())
    }
}

fn parse_command(line: &str) -> Option<ScriptCommand> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let args: Vec<u64> = parts.map(|p| p.parse().ok()).collect::<Option<_>>()?;
    match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("add", &[s, t]) => Some(ScriptCommand::Change {
            action: Action::Add,
            source: NodeId(s),
            target: NodeId(t),
        }),
        ("remove", &[s, t]) => Some(ScriptCommand::Change {
            action: Action::Remove,
            source: NodeId(s),
            target: NodeId(t),
        }),
        ("goto", &[id]) => Some(ScriptCommand::Goto(RevisionId(id))),
        _ => None,
    }
}
