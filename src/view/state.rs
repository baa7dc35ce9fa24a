//! View state and its transitions.
//!
//! [`ViewState`] is a plain value. [`update`] consumes it together with a
//! [`ViewEvent`] and returns the next state plus the requests to send. Local
//! changes (entering or leaving edit mode, editing drafts) take effect at once;
//! persisted changes only show up when the store pushes the next snapshot.

use std::collections::BTreeMap;

use crate::models::{ChunkEntry, ChunkTarget, Example, SemanticChunk, VersionId};
use crate::protocol::{Request, Response};
use crate::repository::clean_steps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Chunks,
    Reasoning,
}

/// A version tab and its review badge (`None` until the chunks arrive).
#[derive(Debug, Clone, PartialEq)]
pub struct VersionTab {
    pub version: VersionId,
    pub all_approved: Option<bool>,
}

/// Inline edit form for one chunk card.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub title: String,
    pub description: String,
    /// Comma-separated, as typed.
    pub tags: String,
    pub examples: Option<Vec<Example>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Title(String),
    Description(String),
    Tags(String),
    ExampleCode(usize, String),
    ExampleExplanation(usize, String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub versions: Vec<VersionTab>,
    pub selected: Option<VersionId>,
    pub mode: ViewMode,
    /// Chunks of the selected version; `None` while loading.
    pub chunks: Option<Vec<ChunkEntry>>,
    /// Reasoning of the selected version; `None` while loading.
    pub reasoning: Option<Vec<String>>,
    /// Cards in edit mode, keyed by chunk id.
    pub editing: BTreeMap<String, ChunkDraft>,
    /// Open reasoning form, if any.
    pub reasoning_draft: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Received(Response),
    SelectVersion(VersionId),
    SelectMode(ViewMode),
    ToggleApproved(String),
    BeginEdit(String),
    EditChunk { id: String, field: DraftField },
    CancelEdit(String),
    SaveEdit(String),
    DeleteChunk(String),
    BeginReasoningEdit,
    EditStep(usize, String),
    AddStep,
    DeleteStep(usize),
    CancelReasoningEdit,
    SaveReasoning,
}

impl ChunkDraft {
    pub fn from_chunk(chunk: &SemanticChunk) -> Self {
        Self {
            title: chunk.title.clone(),
            description: chunk.description.clone(),
            tags: chunk.tags.join(", "),
            examples: chunk.examples.clone(),
        }
    }

    /// The record to send: `base` with the edited fields swapped in.
    ///
    /// Tags are split on commas, trimmed, and empty entries dropped. Examples
    /// are only replaced when the chunk had examples to begin with.
    pub fn apply(&self, base: &SemanticChunk) -> SemanticChunk {
        let mut chunk = base.clone();
        chunk.title = self.title.clone();
        chunk.description = self.description.clone();
        chunk.tags = split_tags(&self.tags);
        if base.examples.is_some() {
            chunk.examples = self.examples.clone();
        }
        chunk
    }

    fn set(&mut self, field: DraftField) {
        match field {
            DraftField::Title(v) => self.title = v,
            DraftField::Description(v) => self.description = v,
            DraftField::Tags(v) => self.tags = v,
            DraftField::ExampleCode(i, v) => {
                if let Some(ex) = self.examples.as_mut().and_then(|e| e.get_mut(i)) {
                    ex.code = v;
                }
            }
            DraftField::ExampleExplanation(i, v) => {
                if let Some(ex) = self.examples.as_mut().and_then(|e| e.get_mut(i)) {
                    ex.explanation = v;
                }
            }
        }
    }
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl ViewState {
    pub fn tab(&self, version: &str) -> Option<&VersionTab> {
        self.versions.iter().find(|t| t.version == version)
    }

    pub fn entry(&self, id: &str) -> Option<&ChunkEntry> {
        self.chunks.as_ref()?.iter().find(|e| e.id == id)
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.contains_key(id)
    }

    fn mark_status(&mut self, version: &str, chunks: &[ChunkEntry]) {
        let approved = chunks.iter().all(|e| e.chunk.approved);
        if let Some(tab) = self.versions.iter_mut().find(|t| t.version == version) {
            tab.all_approved = Some(approved);
        }
    }

    fn data_request(&self) -> Option<Request> {
        let version = self.selected.clone()?;
        Some(match self.mode {
            ViewMode::Chunks => Request::GetChunks { version },
            ViewMode::Reasoning => Request::GetReasoning { version },
        })
    }
}

/// Initial state and the first request.
pub fn init() -> (ViewState, Vec<Request>) {
    (ViewState::default(), vec![Request::GetVersions])
}

pub fn update(mut state: ViewState, event: ViewEvent) -> (ViewState, Vec<Request>) {
    let mut out = Vec::new();
    match event {
        ViewEvent::Received(response) => return receive(state, response),
        ViewEvent::SelectVersion(version) => return select_version(state, version),
        ViewEvent::SelectMode(mode) => {
            state.mode = mode;
            state.editing.clear();
            state.reasoning_draft = None;
            out.extend(state.data_request());
        }
        ViewEvent::ToggleApproved(id) => {
            if let (Some(version), Some(entry)) = (state.selected.clone(), state.entry(&id)) {
                let mut chunk = entry.chunk.clone();
                chunk.approved = !chunk.approved;
                out.push(Request::UpdateChunk {
                    version,
                    target: ChunkTarget::Id(id),
                    chunk,
                });
            }
        }
        ViewEvent::BeginEdit(id) => {
            if !state.is_editing(&id) {
                if let Some(draft) = state.entry(&id).map(|e| ChunkDraft::from_chunk(&e.chunk)) {
                    state.editing.insert(id, draft);
                }
            }
        }
        ViewEvent::EditChunk { id, field } => {
            if let Some(draft) = state.editing.get_mut(&id) {
                draft.set(field);
            }
        }
        ViewEvent::CancelEdit(id) => {
            state.editing.remove(&id);
        }
        ViewEvent::SaveEdit(id) => {
            if let Some(draft) = state.editing.remove(&id) {
                if let (Some(version), Some(entry)) = (state.selected.clone(), state.entry(&id)) {
                    out.push(Request::UpdateChunk {
                        version,
                        target: ChunkTarget::Id(id),
                        chunk: draft.apply(&entry.chunk),
                    });
                }
            }
        }
        ViewEvent::DeleteChunk(id) => {
            let known = state.entry(&id).is_some();
            if let (true, Some(version)) = (known, state.selected.clone()) {
                state.editing.remove(&id);
                out.push(Request::DeleteChunk {
                    version,
                    target: ChunkTarget::Id(id),
                });
            }
        }
        ViewEvent::BeginReasoningEdit => {
            if state.reasoning_draft.is_none() {
                state.reasoning_draft = state.reasoning.clone();
            }
        }
        ViewEvent::EditStep(i, text) => {
            if let Some(step) = state.reasoning_draft.as_mut().and_then(|d| d.get_mut(i)) {
                *step = text;
            }
        }
        ViewEvent::AddStep => {
            if let Some(draft) = state.reasoning_draft.as_mut() {
                draft.push(String::new());
            }
        }
        ViewEvent::DeleteStep(i) => {
            if let Some(draft) = state.reasoning_draft.as_mut() {
                if i < draft.len() {
                    draft.remove(i);
                }
            }
        }
        ViewEvent::CancelReasoningEdit => {
            state.reasoning_draft = None;
        }
        ViewEvent::SaveReasoning => {
            if let Some(draft) = state.reasoning_draft.take() {
                if let Some(version) = state.selected.clone() {
                    out.push(Request::UpdateReasoning {
                        version,
                        reasoning: clean_steps(draft),
                    });
                }
            }
        }
    }
    (state, out)
}

fn select_version(mut state: ViewState, version: VersionId) -> (ViewState, Vec<Request>) {
    state.selected = Some(version);
    state.chunks = None;
    state.reasoning = None;
    state.editing.clear();
    state.reasoning_draft = None;
    let out = state.data_request().into_iter().collect();
    (state, out)
}

fn receive(mut state: ViewState, response: Response) -> (ViewState, Vec<Request>) {
    match response {
        Response::Versions { data } => {
            let mut out: Vec<Request> = data
                .iter()
                .map(|v| Request::GetChunks { version: v.clone() })
                .collect();
            state.versions = data
                .iter()
                .map(|v| VersionTab {
                    version: v.clone(),
                    all_approved: None,
                })
                .collect();

            let keep = state
                .selected
                .clone()
                .filter(|v| state.tab(v).is_some())
                .or_else(|| data.first().cloned());
            match keep {
                Some(version) => {
                    let (next, more) = select_version(state, version);
                    out.extend(more);
                    (next, out)
                }
                None => {
                    state.selected = None;
                    state.chunks = None;
                    state.reasoning = None;
                    (state, out)
                }
            }
        }
        Response::Chunks {
            version,
            data: chunks,
        }
        | Response::RefreshChunks { version, chunks } => {
            state.mark_status(&version, &chunks);
            if state.selected.as_deref() == Some(version.as_str()) {
                state.editing.retain(|id, _| chunks.iter().any(|e| &e.id == id));
                state.chunks = Some(chunks);
            }
            (state, Vec::new())
        }
        Response::Reasoning { version, data } => {
            if state.selected.as_deref() == Some(version.as_str()) {
                state.reasoning = Some(data);
            }
            (state, Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assign_ids;

    fn chunk(title: &str, approved: bool) -> SemanticChunk {
        SemanticChunk {
            title: title.to_string(),
            description: "d".to_string(),
            tags: vec!["x".to_string(), "y".to_string()],
            examples: Some(vec![Example {
                code: "f()".to_string(),
                explanation: "calls f".to_string(),
            }]),
            generated_timestamp: "t".to_string(),
            approved,
        }
    }

    fn loaded(versions: &[&str]) -> ViewState {
        let (state, _) = init();
        let (state, _) = update(
            state,
            ViewEvent::Received(Response::Versions {
                data: versions.iter().map(|v| v.to_string()).collect(),
            }),
        );
        let (state, _) = update(
            state,
            ViewEvent::Received(Response::Chunks {
                version: versions[0].to_string(),
                data: assign_ids(&[chunk("A", false), chunk("B", true)]),
            }),
        );
        state
    }

    #[test]
    fn test_versions_select_first_and_fetch_all() {
        let (state, reqs) = init();
        assert_eq!(reqs, vec![Request::GetVersions]);
        let (state, reqs) = update(
            state,
            ViewEvent::Received(Response::Versions {
                data: vec!["1.0".to_string(), "2.0".to_string()],
            }),
        );
        assert_eq!(state.selected.as_deref(), Some("1.0"));
        assert_eq!(
            reqs,
            vec![
                Request::GetChunks {
                    version: "1.0".to_string()
                },
                Request::GetChunks {
                    version: "2.0".to_string()
                },
                Request::GetChunks {
                    version: "1.0".to_string()
                },
            ]
        );
        assert!(state.versions.iter().all(|t| t.all_approved.is_none()));
    }

    #[test]
    fn test_empty_catalog() {
        let (state, _) = init();
        let (state, reqs) = update(
            state,
            ViewEvent::Received(Response::Versions { data: vec![] }),
        );
        assert!(reqs.is_empty());
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_badge_follows_chunks() {
        let state = loaded(&["1.0", "2.0"]);
        assert_eq!(state.tab("1.0").unwrap().all_approved, Some(false));
        assert_eq!(state.tab("2.0").unwrap().all_approved, None);

        let (state, _) = update(
            state,
            ViewEvent::Received(Response::RefreshChunks {
                version: "2.0".to_string(),
                chunks: assign_ids(&[chunk("C", true)]),
            }),
        );
        assert_eq!(state.tab("2.0").unwrap().all_approved, Some(true));
        // Not the selected version: list untouched.
        assert_eq!(state.chunks.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_mode_switch_requests_reasoning() {
        let state = loaded(&["1.0"]);
        let (state, reqs) = update(state, ViewEvent::SelectMode(ViewMode::Reasoning));
        assert_eq!(state.mode, ViewMode::Reasoning);
        assert_eq!(
            reqs,
            vec![Request::GetReasoning {
                version: "1.0".to_string()
            }]
        );
    }

    #[test]
    fn test_select_version_clears_data() {
        let state = loaded(&["1.0", "2.0"]);
        let (state, reqs) = update(state, ViewEvent::SelectVersion("2.0".to_string()));
        assert!(state.chunks.is_none());
        assert_eq!(
            reqs,
            vec![Request::GetChunks {
                version: "2.0".to_string()
            }]
        );
    }

    #[test]
    fn test_toggle_sends_full_record_flipped() {
        let state = loaded(&["1.0"]);
        let id = state.chunks.as_ref().unwrap()[0].id.clone();
        let (state, reqs) = update(state, ViewEvent::ToggleApproved(id.clone()));
        let mut expected = chunk("A", false);
        expected.approved = true;
        assert_eq!(
            reqs,
            vec![Request::UpdateChunk {
                version: "1.0".to_string(),
                target: ChunkTarget::Id(id),
                chunk: expected
            }]
        );
        // Nothing changes locally until the refresh arrives.
        assert!(!state.chunks.as_ref().unwrap()[0].chunk.approved);
    }

    #[test]
    fn test_edit_cancel_is_local() {
        let state = loaded(&["1.0"]);
        let id = state.chunks.as_ref().unwrap()[0].id.clone();
        let (state, reqs) = update(state, ViewEvent::BeginEdit(id.clone()));
        assert!(reqs.is_empty());
        assert!(state.is_editing(&id));

        let (state, _) = update(
            state,
            ViewEvent::EditChunk {
                id: id.clone(),
                field: DraftField::Title("Changed".to_string()),
            },
        );
        let (state, reqs) = update(state, ViewEvent::CancelEdit(id.clone()));
        assert!(reqs.is_empty());
        assert!(!state.is_editing(&id));
        assert_eq!(state.chunks.as_ref().unwrap()[0].chunk.title, "A");
    }

    #[test]
    fn test_begin_edit_twice_keeps_draft() {
        let state = loaded(&["1.0"]);
        let id = state.chunks.as_ref().unwrap()[0].id.clone();
        let (state, _) = update(state, ViewEvent::BeginEdit(id.clone()));
        let (state, _) = update(
            state,
            ViewEvent::EditChunk {
                id: id.clone(),
                field: DraftField::Description("new".to_string()),
            },
        );
        let (state, _) = update(state, ViewEvent::BeginEdit(id.clone()));
        assert_eq!(state.editing[&id].description, "new");
    }

    #[test]
    fn test_save_edit_exits_immediately() {
        let state = loaded(&["1.0"]);
        let id = state.chunks.as_ref().unwrap()[1].id.clone();
        let (state, _) = update(state, ViewEvent::BeginEdit(id.clone()));
        let edits = [
            DraftField::Title("B2".to_string()),
            DraftField::Tags(" one, ,two ,".to_string()),
            DraftField::ExampleCode(0, "g()".to_string()),
            DraftField::ExampleExplanation(3, "ignored".to_string()),
        ];
        let mut state = state;
        for field in edits {
            state = update(
                state,
                ViewEvent::EditChunk {
                    id: id.clone(),
                    field,
                },
            )
            .0;
        }
        let (state, reqs) = update(state, ViewEvent::SaveEdit(id.clone()));
        assert!(!state.is_editing(&id));

        let Request::UpdateChunk { chunk, target, .. } = &reqs[0] else {
            panic!("expected updateChunk");
        };
        assert_eq!(target, &ChunkTarget::Id(id));
        assert_eq!(chunk.title, "B2");
        assert_eq!(chunk.tags, vec!["one", "two"]);
        assert_eq!(chunk.examples.as_ref().unwrap()[0].code, "g()");
        assert_eq!(chunk.examples.as_ref().unwrap()[0].explanation, "calls f");
        assert!(chunk.approved);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let state = loaded(&["1.0"]);
        let before = state.clone();
        let (state, reqs) = update(state, ViewEvent::DeleteChunk("missing".to_string()));
        assert!(reqs.is_empty());
        let (state, reqs) = update(state, ViewEvent::BeginEdit("missing".to_string()));
        assert!(reqs.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_reasoning_edit_flow() {
        let state = loaded(&["1.0"]);
        let (state, _) = update(state, ViewEvent::SelectMode(ViewMode::Reasoning));
        let (state, _) = update(
            state,
            ViewEvent::Received(Response::Reasoning {
                version: "1.0".to_string(),
                data: vec!["one".to_string(), "two".to_string()],
            }),
        );
        let (state, _) = update(state, ViewEvent::BeginReasoningEdit);
        let (state, _) = update(state, ViewEvent::AddStep);
        let (state, _) = update(state, ViewEvent::EditStep(2, "  three ".to_string()));
        let (state, _) = update(state, ViewEvent::AddStep);
        let (state, _) = update(state, ViewEvent::DeleteStep(0));
        assert_eq!(
            state.reasoning_draft.as_deref().unwrap(),
            &["two".to_string(), "  three ".to_string(), String::new()]
        );

        let (state, reqs) = update(state, ViewEvent::SaveReasoning);
        assert!(state.reasoning_draft.is_none());
        assert_eq!(
            reqs,
            vec![Request::UpdateReasoning {
                version: "1.0".to_string(),
                reasoning: vec!["two".to_string(), "three".to_string()]
            }]
        );
        assert_eq!(state.reasoning.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_reasoning_cancel_discards() {
        let state = loaded(&["1.0"]);
        let (state, _) = update(
            state,
            ViewEvent::Received(Response::Reasoning {
                version: "1.0".to_string(),
                data: vec!["one".to_string()],
            }),
        );
        let (state, _) = update(state, ViewEvent::BeginReasoningEdit);
        let (state, _) = update(state, ViewEvent::DeleteStep(0));
        let (state, reqs) = update(state, ViewEvent::CancelReasoningEdit);
        assert!(reqs.is_empty());
        assert!(state.reasoning_draft.is_none());
        assert_eq!(state.reasoning.as_deref().unwrap(), &["one".to_string()]);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("a, b ,c"), vec!["a", "b", "c"]);
        assert!(split_tags(" , ").is_empty());
    }
}
