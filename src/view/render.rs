//! Text rendering of a [`ViewState`].
//!
//! Rendering is a pure function of the state: version tabs with their review
//! badge, the view-mode tabs, then either the chunk cards or the reasoning list.
//! Cards in edit mode show their inline form instead of their content.

use std::fmt::Write;

use super::state::{ChunkDraft, ViewMode, ViewState};
use crate::models::{ChunkEntry, Example};

const APPROVED_BADGE: &str = "✓";

pub fn render(state: &ViewState) -> String {
    let mut out = String::new();

    if state.versions.is_empty() {
        out.push_str("No semantic versions found.\n");
        return out;
    }

    render_version_tabs(state, &mut out);
    render_mode_tabs(state.mode, &mut out);
    out.push('\n');

    match state.mode {
        ViewMode::Chunks => render_chunks(state, &mut out),
        ViewMode::Reasoning => render_reasoning(state, &mut out),
    }
    out
}

fn render_version_tabs(state: &ViewState, out: &mut String) {
    let tabs: Vec<String> = state
        .versions
        .iter()
        .map(|tab| {
            let badge = if tab.all_approved == Some(true) {
                format!(" {}", APPROVED_BADGE)
            } else {
                String::new()
            };
            if state.selected.as_deref() == Some(tab.version.as_str()) {
                format!("[*{}{}*]", tab.version, badge)
            } else {
                format!("[{}{}]", tab.version, badge)
            }
        })
        .collect();
    let _ = writeln!(out, "Versions: {}", tabs.join(" "));
}

fn render_mode_tabs(mode: ViewMode, out: &mut String) {
    let (chunks, reasoning) = match mode {
        ViewMode::Chunks => ("(Chunks)", "Reasoning"),
        ViewMode::Reasoning => ("Chunks", "(Reasoning)"),
    };
    let _ = writeln!(out, "View: {} {}", chunks, reasoning);
}

fn render_chunks(state: &ViewState, out: &mut String) {
    let Some(chunks) = state.chunks.as_ref() else {
        out.push_str("Loading…\n");
        return;
    };
    if chunks.is_empty() {
        out.push_str("No chunks in this version.\n");
        return;
    }
    for (pos, entry) in chunks.iter().enumerate() {
        match state.editing.get(&entry.id) {
            Some(draft) => render_chunk_form(pos, entry, draft, out),
            None => render_chunk_card(pos, entry, out),
        }
        out.push('\n');
    }
}

fn card_header(pos: usize, entry: &ChunkEntry, out: &mut String) {
    let status = if entry.chunk.approved {
        "approved"
    } else {
        "not approved"
    };
    let _ = writeln!(
        out,
        "#{} {} [{}] (id {})",
        pos,
        entry.chunk.title,
        status,
        entry.id
    );
}

fn render_chunk_card(pos: usize, entry: &ChunkEntry, out: &mut String) {
    card_header(pos, entry, out);
    let _ = writeln!(out, "  Description:");
    push_indented(&entry.chunk.description, "    ", out);
    let _ = writeln!(out, "  Tags: {}", entry.chunk.tags.join(", "));
    if let Some(examples) = entry.chunk.examples.as_ref().filter(|e| !e.is_empty()) {
        let _ = writeln!(out, "  Examples:");
        for example in examples {
            render_example(example, out);
        }
    }
}

fn render_example(example: &Example, out: &mut String) {
    out.push_str("    ```\n");
    push_indented(&example.code, "    ", out);
    out.push_str("    ```\n");
    push_indented(&example.explanation, "    ", out);
}

fn render_chunk_form(pos: usize, entry: &ChunkEntry, draft: &ChunkDraft, out: &mut String) {
    card_header(pos, entry, out);
    out.push_str("  Editing\n");
    let _ = writeln!(out, "  Title: {}", draft.title);
    let _ = writeln!(out, "  Description:");
    push_indented(&draft.description, "    ", out);
    let _ = writeln!(out, "  Tags (comma-separated): {}", draft.tags);
    if let Some(examples) = draft.examples.as_ref() {
        for (i, example) in examples.iter().enumerate() {
            let _ = writeln!(out, "  Example {} Code:", i + 1);
            push_indented(&example.code, "    ", out);
            let _ = writeln!(out, "  Example {} Explanation:", i + 1);
            push_indented(&example.explanation, "    ", out);
        }
    }
    out.push_str("  [Save Changes] [Cancel]\n");
}

fn render_reasoning(state: &ViewState, out: &mut String) {
    out.push_str("Reasoning and Planning\n");
    if let Some(draft) = state.reasoning_draft.as_ref() {
        for (i, step) in draft.iter().enumerate() {
            let _ = writeln!(out, "  Reasoning Step {}:", i + 1);
            push_indented(step, "    ", out);
        }
        out.push_str("  [+ Add Reasoning Step] [Save Changes] [Cancel]\n");
        return;
    }
    match state.reasoning.as_ref() {
        None => out.push_str("Loading…\n"),
        Some(steps) if steps.is_empty() => out.push_str("No reasoning recorded.\n"),
        Some(steps) => {
            for (i, step) in steps.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, step);
            }
        }
    }
}

fn push_indented(text: &str, indent: &str, out: &mut String) {
    for line in text.lines() {
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
}
