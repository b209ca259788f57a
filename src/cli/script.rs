//! Session scripts: a recorded sequence of editor actions, replayed against the service.
//!
//! ```toml
//! model = "free-generation"
//!
//! [[step]]
//! action = "add"
//! name = "Anna Petrova"
//! birth_date = "1935-04-12"
//! generation = 3
//!
//! [[step]]
//! action = "spouse"
//! member = "Anna Petrova"
//! name = "Boris Petrov"
//! ```
//!
//! A failing step is reported and the replay continues, the same way a
//! rejected dialog leaves the session open.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::application::services::FamilyTreeService;
use crate::cli::error::{CliError, CliResult};
use crate::domain::{Level, MemberInput, RelationshipModel, Selector, ValidationError};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionScript {
    #[serde(default)]
    pub model: Option<RelationshipModel>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Add(AddStep),
    Spouse(SpouseStep),
    Undo,
    Export,
}

/// Fields of the add-member dialog. Parents and spouses are referenced by name.
///
/// Set `relation` for the relation models, `generation` (and optionally
/// `parent`) for the free-generation model.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AddStep {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default = "default_alive")]
    pub alive: bool,
    pub death_date: Option<String>,
    pub photo: Option<String>,
    pub relation: Option<String>,
    pub generation: Option<Level>,
    pub parent: Option<String>,
}

/// Create a spouse for `member`, both referenced by name.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SpouseStep {
    pub member: String,
    pub name: String,
}

fn default_alive() -> bool {
    true
}

impl AddStep {
    pub fn input(&self) -> MemberInput {
        MemberInput {
            name: self.name.clone(),
            birth_date: self.birth_date.clone(),
            alive: self.alive,
            death_date: self.death_date.clone(),
            photo: self.photo.clone(),
        }
    }

    /// Selector for this step, resolving the parent name against the live tree.
    pub fn selector(&self, service: &FamilyTreeService) -> Result<Selector, String> {
        if self.relation.is_some() && self.generation.is_some() {
            return Err("set either `relation` or `generation`, not both".into());
        }
        if self.parent.is_some() && self.generation.is_none() {
            return Err("`parent` requires `generation`".into());
        }
        if let Some(generation) = self.generation {
            let parent = match self.parent.as_deref() {
                None => None,
                Some(name) => Some(
                    service
                        .find_by_name(name)
                        .ok_or_else(|| format!("unknown member `{}`", name))?,
                ),
            };
            return Ok(Selector::generation(generation, parent));
        }
        let raw = self.relation.as_deref().unwrap_or_default();
        Selector::relation(raw).map_err(|e: ValidationError| e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Applied,
    /// Applied, but some links were skipped.
    AppliedWithNotices(Vec<String>),
    /// Nothing to do (undo on a fresh tree).
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// 1-based position in the script.
    pub index: usize,
    pub summary: String,
    pub status: StepStatus,
}

impl SessionScript {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("read script {}", path.display()), e))?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::Script {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply every step in order and report each outcome.
    pub fn replay(&self, service: &mut FamilyTreeService) -> Vec<StepReport> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let (summary, status) = run_step(step, service);
                debug!("replay: step {} {} -> {:?}", i + 1, summary, status);
                StepReport {
                    index: i + 1,
                    summary,
                    status,
                }
            })
            .collect()
    }
}

fn run_step(step: &Step, service: &mut FamilyTreeService) -> (String, StepStatus) {
    match step {
        Step::Add(add) => {
            let summary = format!("add {}", add.name.trim());
            let selector = match add.selector(service) {
                Ok(selector) => selector,
                Err(message) => return (summary, StepStatus::Failed(message)),
            };
            let status = match service.add_member(&add.input(), &selector) {
                Ok(outcome) if outcome.notices.is_empty() => StepStatus::Applied,
                Ok(outcome) => StepStatus::AppliedWithNotices(
                    outcome.notices.iter().map(ToString::to_string).collect(),
                ),
                Err(e) => StepStatus::Failed(e.to_string()),
            };
            (summary, status)
        }
        Step::Spouse(SpouseStep { member, name }) => {
            let summary = format!("link {} as spouse of {}", name.trim(), member.trim());
            let status = match service.find_by_name(member) {
                None => StepStatus::Failed(format!("unknown member `{}`", member)),
                Some(id) => match service.add_spouse(id, name) {
                    Ok(_) => StepStatus::Applied,
                    Err(e) => StepStatus::Failed(e.to_string()),
                },
            };
            (summary, status)
        }
        Step::Undo => {
            let status = if service.undo() {
                StepStatus::Applied
            } else {
                StepStatus::Skipped("nothing to undo".into())
            };
            ("undo".into(), status)
        }
        Step::Export => (service.export(), StepStatus::Applied),
    }
}
