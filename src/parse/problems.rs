//! The problems system is the core error handling mechanism when loading
//! fixtures. Anything that doesn't stop the fixture from being loaded is
//! recorded as a problem together with the action taken to recover from it.
//! See the unit tests of this module for an example of how to do it.

use crate::{ChannelError, Resolution};

pub type Problems = Vec<HandledProblem>;

/// A recoverable problem in a fixture document, with location information and
/// info on the action taken to recover from it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{p}; {action}")]
pub struct HandledProblem {
    p: ProblemAt,
    pub action: String,
}

/// A recoverable problem in a fixture document, with location information.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{p} (at {at})")]
pub struct ProblemAt {
    p: Problem,
    /// JSON path, e.g. `availableChannels/Dimmer/capabilities/2`
    at: String,
}

/// A recoverable kind of problem in a fixture document.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Problem {
    #[error("duplicate channel key '{0}'")]
    DuplicateChannelKey(String),
    #[error("{0}")]
    CapabilityRanges(ChannelError),
    #[error("switching channel aliases {found:?} differ from {expected:?} of the first capability")]
    SwitchingAliasMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("unknown wheel '{0}' referenced")]
    UnknownWheel(String),
    #[error("unknown channel '{0}' referenced")]
    UnknownChannel(String),
    #[error("{0}")]
    InvalidChannel(ChannelError),
    #[error("{fine_channels} fine channel aliases exceed the maximum resolution {max}")]
    TooManyFineChannels { fine_channels: usize, max: Resolution },
}

impl Problem {
    /// Add location information to the problem.
    pub(crate) fn at<T: Into<String>>(self, at: T) -> ProblemAt {
        ProblemAt { p: self, at: at.into() }
    }
}

impl ProblemAt {
    /// Specify what action was taken to resolve the problem and then push it
    /// onto the problems.
    pub fn handled_by<T: Into<String>>(self, action: T, problems: &mut impl ProblemsMut) {
        let handled = HandledProblem {
            p: self,
            action: action.into(),
        };
        tracing::warn!("{handled}");
        problems.problems_mut().push(handled);
    }

    pub fn location(&self) -> &str {
        &self.at
    }
}

pub(crate) trait HandleProblem<T, S: Into<String>> {
    fn ok_or_handled_by(self, action: S, problems: &mut impl ProblemsMut) -> Option<T>;
}

impl<T, S: Into<String>> HandleProblem<T, S> for Result<T, ProblemAt> {
    /// Specify what action will be taken to resolve a possible Err(Problem),
    /// push it onto problems and return None. If the result is Ok(v), Some(v)
    /// is returned instead.
    fn ok_or_handled_by(self, action: S, problems: &mut impl ProblemsMut) -> Option<T> {
        match self {
            Ok(t) => Some(t),
            Err(p) => {
                p.handled_by(action, problems);
                None
            }
        }
    }
}

/// Anything that collects problems.
pub trait ProblemsMut {
    fn problems_mut(&mut self) -> &mut Problems;
}

impl ProblemsMut for Problems {
    fn problems_mut(&mut self) -> &mut Problems {
        self
    }
}

impl HandledProblem {
    pub fn problem(&self) -> &Problem {
        &self.p.p
    }

    pub fn location(&self) -> &str {
        self.p.location()
    }
}
