use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::detect::Conflict;
use crate::error::SyncError;

/// What to do with an incoming file that collides with an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// Overwrite the existing file with the incoming one, then remove the incoming one.
    Replace,
    /// Discard the incoming file.
    Skip,
    /// Leave both files where they are.
    KeepBoth,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Resolution::Replace => "replace",
            Resolution::Skip => "skip",
            Resolution::KeepBoth => "keep-both",
        })
    }
}

impl FromStr for Resolution {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Resolution::Replace),
            "skip" | "abort" => Ok(Resolution::Skip),
            "keep-both" | "keep_both" | "keep" => Ok(Resolution::KeepBoth),
            _ => Err(SyncError::InvalidResolution(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Resolve(Resolution),
    /// Stop the run. Conflicts already resolved stay resolved.
    Cancel,
}

impl From<Resolution> for Decision {
    fn from(resolution: Resolution) -> Self {
        Decision::Resolve(resolution)
    }
}

/// Supplies the decisions for a run, usually by asking a person.
pub trait Decider {
    /// Chooses how to resolve `conflict`.
    fn decide(&mut self, conflict: &Conflict) -> Result<Decision, SyncError>;

    /// Asked once, straight after the first decision of a run. Returning true
    /// applies that decision to every remaining conflict.
    fn ask_stickiness(&mut self) -> bool;
}

impl<'a, D: Decider + ?Sized> Decider for &'a mut D {
    fn decide(&mut self, conflict: &Conflict) -> Result<Decision, SyncError> {
        (**self).decide(conflict)
    }

    fn ask_stickiness(&mut self) -> bool {
        (**self).ask_stickiness()
    }
}

/// Gives the same answer to every conflict.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecider(pub Resolution);

impl Decider for FixedDecider {
    fn decide(&mut self, _: &Conflict) -> Result<Decision, SyncError> {
        Ok(Decision::Resolve(self.0))
    }

    fn ask_stickiness(&mut self) -> bool {
        true
    }
}

/// Replays a prepared list of answers, for headless runs.
#[derive(Debug, Default)]
pub struct ScriptedDecider {
    answers: VecDeque<Decision>,
    sticky: bool,
    /// relative paths of the conflicts `decide` was called for, in order
    pub asked: Vec<String>,
    pub stickiness_prompts: usize,
}

impl ScriptedDecider {
    pub fn new<I, T>(answers: I, sticky: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Decision>,
    {
        ScriptedDecider {
            answers: answers.into_iter().map(Into::into).collect(),
            sticky,
            asked: Vec::new(),
            stickiness_prompts: 0,
        }
    }
}

impl Decider for ScriptedDecider {
    fn decide(&mut self, conflict: &Conflict) -> Result<Decision, SyncError> {
        self.asked.push(conflict.relative_path().to_owned());
        self.answers.pop_front().ok_or_else(|| {
            SyncError::InvalidResolution(format!(
                "no answer left for {}",
                conflict.relative_path()
            ))
        })
    }

    fn ask_stickiness(&mut self) -> bool {
        self.stickiness_prompts += 1;
        self.sticky
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    AwaitingDecision,
    Applying,
    Done,
}

/// Walks a run through its conflicts one at a time, remembering a sticky decision.
#[derive(Debug)]
pub struct Resolver {
    state: State,
    apply_to_all: bool,
    remembered: Option<Resolution>,
    stickiness_asked: bool,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            state: State::Idle,
            apply_to_all: false,
            remembered: None,
            stickiness_asked: false,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The resolution being applied to all remaining conflicts, if any.
    pub fn sticky_resolution(&self) -> Option<Resolution> {
        if self.apply_to_all {
            self.remembered
        } else {
            None
        }
    }

    /// Picks the resolution for the next conflict. `None` means the decider cancelled the run.
    pub fn choose<D>(
        &mut self,
        conflict: &Conflict,
        decider: &mut D,
    ) -> Result<Option<Resolution>, SyncError>
    where
        D: Decider + ?Sized,
    {
        debug_assert_eq!(self.state, State::Idle);
        self.state = State::AwaitingDecision;

        if let Some(resolution) = self.sticky_resolution() {
            debug!("Applying sticky {} to {:?}", resolution, conflict.relative_path());
            self.state = State::Applying;
            return Ok(Some(resolution));
        }

        let resolution = match decider.decide(conflict)? {
            Decision::Resolve(resolution) => resolution,
            Decision::Cancel => {
                info!("Run cancelled at {:?}", conflict.relative_path());
                self.state = State::Done;
                return Ok(None);
            }
        };
        debug!("Decided {} for {:?}", resolution, conflict.relative_path());

        if !self.stickiness_asked {
            self.stickiness_asked = true;
            if decider.ask_stickiness() {
                debug!("Applying {} to all remaining conflicts", resolution);
                self.apply_to_all = true;
                self.remembered = Some(resolution);
            }
        }

        self.state = State::Applying;
        Ok(Some(resolution))
    }

    /// Resolves a conflict without consulting the decider or affecting stickiness.
    pub fn choose_automatically(&mut self, resolution: Resolution) -> Resolution {
        debug_assert_eq!(self.state, State::Idle);
        self.state = State::Applying;
        resolution
    }

    pub fn applied(&mut self) {
        self.state = State::Idle;
    }

    pub fn finish(&mut self) {
        self.state = State::Done;
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new()
    }
}
