//! Workflow state machine for story projects.
//!
//! A project's stage is never stored. It is derived from which fields are
//! populated, so reloading a project always lands on the same stage. A
//! [`Session`] pairs a loaded project with its active stage; the only way the
//! active stage moves is through [`Session::check`] followed by
//! [`Session::apply`].

use crate::error::{Result, StudioError};
use crate::project::Project;
use crate::review::ReviewVerdict;
use std::fmt;
use std::str::FromStr;

/// Workflow stage enumeration, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Research department turns the idea into a brief.
    Research,

    /// Writer's room turns the brief (and feedback) into a script.
    Drafting,

    /// Editor's desk scores the script and approves or critiques it.
    Review,

    /// Art department produces storyboards for the approved script.
    Production,
}

impl Stage {
    /// All stages, in order.
    pub const ALL: [Stage; 4] = [
        Stage::Research,
        Stage::Drafting,
        Stage::Review,
        Stage::Production,
    ];

    /// Derives the stage from the project's marker fields.
    ///
    /// Pure function of `storyboard_output`, `is_approved`, `script_content`
    /// and `research_brief`.
    pub fn derive(project: &Project) -> Self {
        if !project.storyboard_output.is_empty() || project.is_approved {
            Stage::Production
        } else if !project.script_content.is_empty() {
            Stage::Review
        } else if !project.research_brief.is_empty() {
            Stage::Drafting
        } else {
            Stage::Research
        }
    }

    /// Machine name, used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::Drafting => "drafting",
            Stage::Review => "review",
            Stage::Production => "production",
        }
    }

    /// Department name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Research => "1. Research Dept",
            Stage::Drafting => "2. Writer's Room",
            Stage::Review => "3. Editor's Desk",
            Stage::Production => "4. Art Dept",
        }
    }

    /// Zero-based position in the pipeline.
    pub fn index(&self) -> usize {
        match self {
            Stage::Research => 0,
            Stage::Drafting => 1,
            Stage::Review => 2,
            Stage::Production => 3,
        }
    }

    /// The primary action of this stage.
    pub fn primary_action(&self) -> Action {
        match self {
            Stage::Research => Action::Research,
            Stage::Drafting => Action::Write,
            Stage::Review => Action::Review,
            Stage::Production => Action::Storyboard,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "research" => Ok(Stage::Research),
            "drafting" => Ok(Stage::Drafting),
            "review" => Ok(Stage::Review),
            "production" => Ok(Stage::Production),
            _ => Err(format!("invalid stage: {}", s)),
        }
    }
}

/// A user action that may move the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Run the researcher on the idea.
    Research,
    /// Run the writer on the brief and feedback.
    Write,
    /// Run the editor on the script.
    Review,
    /// Return a reviewed, unapproved script to the writer.
    SendBack,
    /// Run the storyboard artist on the script.
    Storyboard,
}

impl Action {
    /// The only stage this action is legal from.
    pub fn legal_from(&self) -> Stage {
        match self {
            Action::Research => Stage::Research,
            Action::Write => Stage::Drafting,
            Action::Review | Action::SendBack => Stage::Review,
            Action::Storyboard => Stage::Production,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::Research => "run research",
            Action::Write => "write the script",
            Action::Review => "run a review",
            Action::SendBack => "send the script back to the writer",
            Action::Storyboard => "generate storyboards",
        };
        f.write_str(text)
    }
}

/// The result of a successful action, ready to be applied to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The researcher produced a brief.
    Researched(String),
    /// The writer produced a new draft.
    Drafted(String),
    /// The editor produced a verdict.
    Reviewed(ReviewVerdict),
    /// The script went back to the writer.
    SentBack,
    /// The storyboard artist produced markdown.
    Storyboarded(String),
}

/// A loaded project and the stage the user is working in.
#[derive(Debug, Clone)]
pub struct Session {
    /// Last-known-good copy of the project record.
    pub project: Project,

    /// Active workflow stage.
    pub stage: Stage,

    /// Number of agent invocations that completed in this session.
    pub invocations: u32,
}

impl Session {
    /// Opens a session on the project's derived stage.
    pub fn open(project: Project) -> Self {
        let stage = Stage::derive(&project);
        Self {
            project,
            stage,
            invocations: 0,
        }
    }

    /// The stage the stored fields point at, ignoring session moves.
    pub fn derived_stage(&self) -> Stage {
        Stage::derive(&self.project)
    }

    /// Whether the send-back action is currently offered.
    pub fn can_send_back(&self) -> bool {
        self.stage == Stage::Review
            && self.project.has_been_reviewed()
            && !self.project.is_approved
    }

    /// Validates an action against the active stage and the project fields.
    ///
    /// # Errors
    ///
    /// - [`StudioError::IllegalTransition`] if the action is not legal from
    ///   the active stage, or a send-back is requested before any review or
    ///   after approval.
    /// - [`StudioError::MissingPrerequisite`] if a field the action consumes
    ///   is empty.
    pub fn check(&self, action: Action) -> Result<()> {
        if action.legal_from() != self.stage {
            return Err(self.illegal(action));
        }

        let project = &self.project;
        match action {
            Action::Research if project.original_idea.trim().is_empty() => {
                Err(StudioError::MissingPrerequisite("original idea"))
            }
            Action::Write if project.research_brief.is_empty() => {
                Err(StudioError::MissingPrerequisite("research brief"))
            }
            Action::Review | Action::Storyboard if project.script_content.is_empty() => {
                Err(StudioError::MissingPrerequisite("script"))
            }
            Action::SendBack if !self.can_send_back() => Err(self.illegal(action)),
            _ => Ok(()),
        }
    }

    /// Applies a successful outcome to the in-memory project and moves the
    /// active stage.
    ///
    /// The caller persists the outcome first; this only mirrors it.
    pub fn apply(&mut self, outcome: Outcome) {
        let from = self.stage;
        match outcome {
            Outcome::Researched(brief) => {
                self.project.research_brief = brief;
                self.stage = Stage::Drafting;
            }
            Outcome::Drafted(script) => {
                self.project.script_content = script;
                self.stage = Stage::Review;
            }
            Outcome::Reviewed(verdict) => {
                self.project.editor_feedback = verdict.critique;
                self.project.editor_score = verdict.score;
                self.project.is_approved = verdict.approved;
                self.project.review_count += 1;
                if verdict.approved {
                    self.stage = Stage::Production;
                }
            }
            Outcome::SentBack => {
                self.stage = Stage::Drafting;
            }
            Outcome::Storyboarded(markdown) => {
                self.project.storyboard_output = markdown;
                self.stage = Stage::Production;
            }
        }

        tracing::info!(
            project = self.project.id,
            from = from.as_str(),
            to = self.stage.as_str(),
            "stage updated"
        );
    }

    /// Counts a completed agent invocation.
    pub fn record_invocation(&mut self) {
        self.invocations += 1;
    }

    fn illegal(&self, action: Action) -> StudioError {
        StudioError::IllegalTransition {
            stage: self.stage,
            action,
        }
    }
}
