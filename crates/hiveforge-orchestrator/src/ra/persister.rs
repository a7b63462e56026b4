// hiveforge-orchestrator/src/ra/persister.rs
// ============================================================================
// Module: Spec Persister
// Description: Persists SpecDraft as a structured YAML document plus a BDD
//              feature file, with monotonic doc-id assignment (§4.5.4).
// Dependencies: hiveforge_core::{SpecDraft, DocId}, serde_yaml, std::fs
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use hiveforge_core::DocId;
use hiveforge_core::SpecDraft;
use serde::Deserialize;
use serde::Serialize;

use crate::error::OrchestratorError;

/// Prefix doc ids are minted under, e.g. `REQ001`.
const DEFAULT_PREFIX: &str = "REQ";

/// A persisted requirement document: the structured draft plus its
/// human-readable rendering and review state (§4.5.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDocument {
    /// Assigned document id.
    pub id: String,
    /// The spec draft this document wraps.
    pub draft: SpecDraft,
    /// Human-readable multi-section rendering of `draft`.
    pub text: String,
    /// Set once a human has reviewed this document; reset by `update_text`.
    pub reviewed: Option<bool>,
}

/// A unified diff-like summary between two drafts of the same document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpecDiff {
    /// Fields whose value changed between the two drafts.
    pub changed_fields: Vec<String>,
    /// Whether the goal text changed.
    pub goal_changed: bool,
    /// Net change in acceptance criterion count.
    pub criteria_delta: i64,
}

/// Persists and retrieves [`SpecDraft`]s as YAML documents plus BDD feature
/// files under a requirements directory (§4.5.4).
pub struct SpecPersister {
    root: PathBuf,
    prefix: String,
}

impl SpecPersister {
    /// Opens a persister rooted at `root`, creating the directory if absent.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Io`] if `root` cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, OrchestratorError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, prefix: DEFAULT_PREFIX.to_string() })
    }

    fn doc_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.yaml"))
    }

    fn feature_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.feature"))
    }

    /// Scans `root` for existing documents and returns the next free id
    /// (§4.5.4: `<PREFIX><zero-padded-number>`, largest existing number plus
    /// one).
    fn next_id(&self) -> Result<String, OrchestratorError> {
        let mut max_seen: u32 = 0;
        if self.root.is_dir() {
            for entry in fs::read_dir(&self.root)? {
                let entry = entry?;
                let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                    continue;
                };
                if let Some(number) = stem.strip_prefix(&self.prefix) {
                    if let Ok(parsed) = number.parse::<u32>() {
                        max_seen = max_seen.max(parsed);
                    }
                }
            }
        }
        Ok(format!("{}{:03}", self.prefix, max_seen + 1))
    }

    /// Persists `draft` as a new document, assigning a fresh id unless
    /// `explicit_id` is given. Rejects collisions with an explicit id that
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Persistence`] on an id collision, or
    /// [`OrchestratorError::Io`]/[`OrchestratorError::Yaml`] on I/O failure.
    pub fn persist(&self, mut draft: SpecDraft, explicit_id: Option<&str>) -> Result<PersistedDocument, OrchestratorError> {
        let id = match explicit_id {
            Some(id) => {
                if self.doc_path(id).exists() {
                    return Err(OrchestratorError::Persistence(format!("document {id} already exists")));
                }
                id.to_string()
            }
            None => self.next_id()?,
        };

        draft.doorstop_id = Some(DocId::new(id.clone()));
        draft.file_path = Some(self.doc_path(&id).to_string_lossy().into_owned());

        let text = render_text(&draft);
        let document = PersistedDocument { id: id.clone(), draft, text, reviewed: None };

        self.write(&document)?;
        Ok(document)
    }

    fn write(&self, document: &PersistedDocument) -> Result<(), OrchestratorError> {
        let yaml = serde_yaml::to_string(document)?;
        fs::write(self.doc_path(&document.id), yaml)?;
        fs::write(self.feature_path(&document.id), render_feature(&document.id, &document.draft))?;
        Ok(())
    }

    /// Reads a persisted document by id.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Persistence`] if the document does not
    /// exist, or propagates I/O/YAML failures.
    pub fn read(&self, id: &str) -> Result<PersistedDocument, OrchestratorError> {
        let path = self.doc_path(id);
        if !path.exists() {
            return Err(OrchestratorError::Persistence(format!("document {id} not found")));
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Lists every persisted document id under the requirements directory.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Io`].
    pub fn list_items(&self) -> Result<Vec<String>, OrchestratorError> {
        let mut ids = Vec::new();
        if self.root.is_dir() {
            for entry in fs::read_dir(&self.root)? {
                let entry = entry?;
                if entry.path().extension().and_then(|e| e.to_str()) == Some("yaml") {
                    if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                        ids.push(stem.to_string());
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Computes a diff between a persisted document and a candidate
    /// replacement draft.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::read`]'s errors.
    pub fn diff(&self, id: &str, new_draft: &SpecDraft) -> Result<SpecDiff, OrchestratorError> {
        let current = self.read(id)?;
        let old = &current.draft;
        let mut changed_fields = Vec::new();
        if old.goal != new_draft.goal {
            changed_fields.push("goal".to_string());
        }
        if old.constraints != new_draft.constraints {
            changed_fields.push("constraints".to_string());
        }
        if old.non_goals != new_draft.non_goals {
            changed_fields.push("non_goals".to_string());
        }
        if old.acceptance_criteria != new_draft.acceptance_criteria {
            changed_fields.push("acceptance_criteria".to_string());
        }
        if old.risk_mitigations != new_draft.risk_mitigations {
            changed_fields.push("risk_mitigations".to_string());
        }
        Ok(SpecDiff {
            goal_changed: old.goal != new_draft.goal,
            criteria_delta: new_draft.acceptance_criteria.len() as i64 - old.acceptance_criteria.len() as i64,
            changed_fields,
        })
    }

    /// Overwrites a document's `text` rendering directly, resetting
    /// `reviewed` to absent (§4.5.4).
    ///
    /// # Errors
    ///
    /// Propagates [`Self::read`]'s errors plus write failures.
    pub fn update_text(&self, id: &str, text: impl Into<String>) -> Result<PersistedDocument, OrchestratorError> {
        let mut document = self.read(id)?;
        document.text = text.into();
        document.reviewed = None;
        self.write(&document)?;
        Ok(document)
    }
}

fn render_text(draft: &SpecDraft) -> String {
    let mut sections = vec![format!("# Goal\n{}", draft.goal)];

    sections.push(render_list("Acceptance Criteria", draft.acceptance_criteria.iter().map(|c| c.text.clone())));
    sections.push(render_list("Constraints", draft.constraints.iter().cloned()));
    sections.push(render_list("Non-Goals", draft.non_goals.iter().cloned()));
    sections.push(render_list("Risk Mitigations", draft.risk_mitigations.iter().cloned()));
    sections.push(render_list("Open Items", draft.open_items.iter().cloned()));

    sections.join("\n\n")
}

fn render_list(title: &str, items: impl Iterator<Item = String>) -> String {
    let body: Vec<String> = items.map(|item| format!("- {item}")).collect();
    if body.is_empty() {
        format!("# {title}\n(none)")
    } else {
        format!("# {title}\n{}", body.join("\n"))
    }
}

fn render_feature(id: &str, draft: &SpecDraft) -> String {
    let mut feature = format!("Feature: {id}\n  {}\n\n", draft.goal);
    for (index, criterion) in draft.acceptance_criteria.iter().enumerate() {
        feature.push_str(&format!(
            "  Scenario: criterion {n}\n    Given the system under test\n    Then {text}\n\n",
            n = index + 1,
            text = criterion.text,
        ));
    }
    feature
}

/// Returns the requirements directory's path.
#[must_use]
pub fn directory(root: &Path) -> PathBuf {
    root.to_path_buf()
}
