use std::ops::Range;

use regex::Regex;

use crate::model::task::{Category, Substep, Task};

/// Which field of a task or substep matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Category,
    StepName,
    Description,
    SubstepName,
    SubstepDescription,
}

/// A search hit. `substep` is set when the match landed on a substep field.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub category: String,
    pub step: u32,
    pub substep: Option<u32>,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

/// Compile a user query into a case-insensitive literal regex
pub fn compile_query(query: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", regex::escape(query)))
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

// ---------------------------------------------------------------------------
// Catalog search
// ---------------------------------------------------------------------------

/// Search the catalog by category name, step fields, and substep fields.
///
/// A category-name match produces one hit per task in that category, so
/// searching "cash" surfaces the whole Cash section the way filtering the
/// step list would.
pub fn search_catalog(categories: &[Category], re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for category in categories {
        let category_spans = find_matches(re, &category.name);
        for task in &category.tasks {
            if !category_spans.is_empty() {
                hits.push(SearchHit {
                    category: category.name.clone(),
                    step: task.step_number,
                    substep: None,
                    field: MatchField::Category,
                    spans: category_spans.clone(),
                });
            }
            search_task(re, task, &category.name, &mut hits);
        }
    }

    hits
}

fn search_task(re: &Regex, task: &Task, category: &str, hits: &mut Vec<SearchHit>) {
    let spans = find_matches(re, &task.step_name);
    if !spans.is_empty() {
        hits.push(SearchHit {
            category: category.to_string(),
            step: task.step_number,
            substep: None,
            field: MatchField::StepName,
            spans,
        });
    }

    let spans = find_matches(re, &task.description);
    if !spans.is_empty() {
        hits.push(SearchHit {
            category: category.to_string(),
            step: task.step_number,
            substep: None,
            field: MatchField::Description,
            spans,
        });
    }

    for substep in &task.substeps {
        search_substep(re, task, substep, category, hits);
    }
}

fn search_substep(
    re: &Regex,
    task: &Task,
    substep: &Substep,
    category: &str,
    hits: &mut Vec<SearchHit>,
) {
    let spans = find_matches(re, &substep.sub_step_name);
    if !spans.is_empty() {
        hits.push(SearchHit {
            category: category.to_string(),
            step: task.step_number,
            substep: Some(substep.sub_step_number),
            field: MatchField::SubstepName,
            spans,
        });
    }

    let spans = find_matches(re, &substep.sub_step_description);
    if !spans.is_empty() {
        hits.push(SearchHit {
            category: category.to_string(),
            step: task.step_number,
            substep: Some(substep.sub_step_number),
            field: MatchField::SubstepDescription,
            spans,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
