//! Domain manifest parsing and rule-file loading.
//!
//! A *domain* is a named unit of rule content: a manifest entry describing
//! when it activates (always-on, agent trigger, workflow trigger, recall
//! keywords) plus a rule file holding the actual lines. This crate reads
//! both formats; which domains actually fire is the engine's business.

pub mod manifest;
pub mod rules;

pub use manifest::{
    domain_name_to_file, extract_domain_info, parse_manifest, parse_manifest_str, DomainSpec,
    DomainState, Manifest, GLOBAL_KEYS, KNOWN_SUFFIXES,
};
pub use rules::{is_excluded, load_domain_file, match_keywords, parse_rule_lines};
