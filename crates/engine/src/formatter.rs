//! Output formatter — renders layer contributions into the
//! `<synapse-rules>` block.
//!
//! Sections appear in a fixed order. When the rendered block exceeds the
//! bracket's token budget, sections are dropped in reverse priority;
//! the bracket header, constitution, and agent sections are never
//! dropped.

use crate::layer::LayerRun;
use serde_json::Value;
use synapse_core::Bracket;
use synapse_memory::MemoryHint;
use tracing::debug;

const WRAPPER_OPEN: &str = "<synapse-rules>";
const WRAPPER_CLOSE: &str = "</synapse-rules>";

/// Everything the formatter needs for one render.
pub struct FormatInput<'a> {
    pub bracket: Bracket,
    pub context_percent: f64,
    pub runs: &'a [LayerRun],
    pub memory_hints: &'a [MemoryHint],
    pub devmode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    ContextBracket,
    Constitution,
    Agent,
    Workflow,
    Task,
    Squad,
    Keyword,
    Memory,
    StarCommands,
    Handoff,
    Devmode,
    Summary,
}

/// Reverse-priority drop order. Sections absent from this list are
/// protected and survive any budget.
const DROP_ORDER: [SectionKind; 8] = [
    SectionKind::Summary,
    SectionKind::Devmode,
    SectionKind::StarCommands,
    SectionKind::Memory,
    SectionKind::Keyword,
    SectionKind::Squad,
    SectionKind::Task,
    SectionKind::Workflow,
];

struct Section {
    kind: SectionKind,
    header: String,
    lines: Vec<String>,
}

/// Rough token count: four characters per token, rounded up.
fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

fn find_run<'a>(runs: &'a [LayerRun], name: &str) -> Option<&'a LayerRun> {
    runs.iter().find(|r| r.name == name && r.result.is_some())
}

fn metadata_str<'a>(run: &'a LayerRun, key: &str) -> Option<&'a str> {
    match run.metadata(key) {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn push_strings(values: Option<&Value>, out: &mut Vec<String>) {
    match values {
        Some(Value::String(s)) => out.push(s.clone()),
        Some(Value::Array(items)) => {
            for item in items {
                if let Value::String(s) = item {
                    out.push(s.clone());
                }
            }
        }
        _ => {}
    }
}

fn build_sections(input: &FormatInput<'_>) -> Vec<Section> {
    let mut sections = Vec::new();

    // Bracket header carries the global (L1) rules.
    let mut bracket_lines = vec![
        format!("CONTEXT BRACKET: [{}]", input.bracket),
        format!("{:.0}% remaining", input.context_percent),
    ];
    if let Some(run) = find_run(input.runs, "global") {
        bracket_lines.extend(run.rules().iter().cloned());
    }
    sections.push(Section {
        kind: SectionKind::ContextBracket,
        header: "[CONTEXT BRACKET]".into(),
        lines: bracket_lines,
    });

    if let Some(run) = find_run(input.runs, "constitution") {
        let non_negotiable = matches!(run.metadata("non_negotiable"), Some(Value::Bool(true)));
        sections.push(Section {
            kind: SectionKind::Constitution,
            header: if non_negotiable {
                "[CONSTITUTION] (NON-NEGOTIABLE)".into()
            } else {
                "[CONSTITUTION]".into()
            },
            lines: run.rules().to_vec(),
        });
    }

    // Only a recognized agent (one the agent layer resolved) gets a header.
    if let Some(run) = find_run(input.runs, "agent") {
        if let Some(agent_id) = metadata_str(run, "agent_id") {
            sections.push(Section {
                kind: SectionKind::Agent,
                header: format!("[ACTIVE AGENT: @{agent_id}]"),
                lines: run.rules().to_vec(),
            });
        }
    }

    if let Some(run) = find_run(input.runs, "workflow") {
        if let Some(workflow_id) = metadata_str(run, "workflow_id") {
            let mut lines = Vec::new();
            if let Some(phase) = metadata_str(run, "phase") {
                lines.push(format!("PHASE: {phase}"));
            }
            lines.extend(run.rules().iter().cloned());
            sections.push(Section {
                kind: SectionKind::Workflow,
                header: format!("[ACTIVE WORKFLOW: {workflow_id}]"),
                lines,
            });
        }
    }

    if let Some(run) = find_run(input.runs, "task") {
        sections.push(Section {
            kind: SectionKind::Task,
            header: "[TASK CONTEXT]".into(),
            lines: run.rules().to_vec(),
        });
    }

    if let Some(run) = find_run(input.runs, "squad") {
        if let Some(squad_id) = metadata_str(run, "squad_id") {
            sections.push(Section {
                kind: SectionKind::Squad,
                header: format!("[SQUAD: {squad_id}]"),
                lines: run.rules().to_vec(),
            });
        }
    }

    if let Some(run) = find_run(input.runs, "keyword") {
        if !run.rules().is_empty() {
            sections.push(Section {
                kind: SectionKind::Keyword,
                header: "[KEYWORD MATCHES]".into(),
                lines: run.rules().to_vec(),
            });
        }
    }

    if !input.memory_hints.is_empty() {
        sections.push(Section {
            kind: SectionKind::Memory,
            header: "[MEMORY HINTS]".into(),
            lines: input
                .memory_hints
                .iter()
                .map(|h| h.content.clone())
                .collect(),
        });
    }

    if let Some(run) = find_run(input.runs, "star_command") {
        sections.push(Section {
            kind: SectionKind::StarCommands,
            header: "[STAR COMMANDS]".into(),
            lines: run.rules().to_vec(),
        });
    }

    if input.bracket.policy().handoff_warning {
        sections.push(Section {
            kind: SectionKind::Handoff,
            header: "[HANDOFF WARNING]".into(),
            lines: vec![
                "Context window critically depleted. Summarize progress and prepare a session handoff.".into(),
            ],
        });
    }

    if input.devmode {
        let mut lines = vec!["SYNAPSE DEVMODE".into(), "Pipeline Metrics:".into()];
        for run in input.runs {
            lines.push(format!(
                "  {}: {} ({:.1}ms, {} rules)",
                run.name,
                run.outcome.as_str(),
                run.duration_ms,
                run.rules().len()
            ));
        }
        sections.push(Section {
            kind: SectionKind::Devmode,
            header: "[DEVMODE STATUS]".into(),
            lines,
        });
    }

    let mut collected = Vec::new();
    for run in input.runs {
        if let Some(result) = &run.result {
            push_strings(result.metadata.get("source"), &mut collected);
            push_strings(result.metadata.get("sources"), &mut collected);
            push_strings(result.metadata.get("domains_loaded"), &mut collected);
            push_strings(result.metadata.get("matched_domains"), &mut collected);
        }
    }
    let mut seen = std::collections::HashSet::new();
    let loaded: Vec<String> = collected
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect();
    if !loaded.is_empty() {
        sections.push(Section {
            kind: SectionKind::Summary,
            header: "[LOADED DOMAINS SUMMARY]".into(),
            lines: vec![format!("LOADED DOMAINS: {}", loaded.join(", "))],
        });
    }

    sections
}

fn render(sections: &[Section]) -> String {
    let mut out = String::from(WRAPPER_OPEN);
    for section in sections {
        out.push('\n');
        out.push_str(&section.header);
        for line in &section.lines {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
    }
    out.push_str(WRAPPER_CLOSE);
    out
}

/// Render the rules block, enforcing the bracket's token budget.
pub fn format_output(input: &FormatInput<'_>) -> String {
    let mut sections = build_sections(input);
    let budget = input.bracket.token_budget();

    for kind in DROP_ORDER {
        let text = render(&sections);
        if estimate_tokens(&text) <= budget {
            return text;
        }
        if let Some(pos) = sections.iter().position(|s| s.kind == kind) {
            debug!(section = ?kind, "Formatter: dropping section to fit token budget");
            sections.remove(pos);
        }
    }
    // Whatever survives after the last drop is emitted even if still over
    // budget; protected sections are never sacrificed.
    render(&sections)
}
