//! Content pack validation.
//!
//! A chapter is accepted only if its slides form a directed acyclic graph
//! rooted at the first slide, with every slide reachable and every reference
//! resolvable. Play never re-validates content.

use std::collections::{HashMap, HashSet};

use lathi_core::error::DomainError;

use super::manifest::{ChapterManifest, ContentPack, SlideManifest};

/// Checks the whole pack and reports every problem found.
///
/// # Errors
///
/// Returns `DomainError::Validation` listing all problems, separated by `; `.
pub fn validate(pack: &ContentPack) -> Result<(), DomainError> {
    let mut problems = Vec::new();

    let mut words = HashSet::new();
    for entry in &pack.vocabulary {
        if entry.krama.trim().is_empty() {
            problems.push("vocabulary entry with an empty krama word".to_owned());
        } else if !words.insert(entry.krama.as_str()) {
            problems.push(format!("vocabulary word '{}' is listed twice", entry.krama));
        }
    }

    let mut order_indexes = HashSet::new();
    for chapter in &pack.chapters {
        if chapter.order_index < 1 {
            problems.push(format!(
                "chapter '{}' has order_index {} (must be 1 or more)",
                chapter.title, chapter.order_index
            ));
        }
        if !order_indexes.insert(chapter.order_index) {
            problems.push(format!(
                "order_index {} is used by more than one chapter",
                chapter.order_index
            ));
        }
        validate_chapter(chapter, &words, &mut problems);
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(problems.join("; ")))
    }
}

fn validate_chapter(chapter: &ChapterManifest, words: &HashSet<&str>, problems: &mut Vec<String>) {
    let label = format!("chapter {}", chapter.order_index);
    if chapter.title.trim().is_empty() {
        problems.push(format!("{label} has no title"));
    }
    if chapter.slides.is_empty() {
        problems.push(format!("{label} has no slides"));
        return;
    }

    let mut slides: HashMap<&str, &SlideManifest> = HashMap::new();
    for slide in &chapter.slides {
        if slides.insert(slide.key.as_str(), slide).is_some() {
            problems.push(format!("{label}: slide key '{}' is used twice", slide.key));
        }
    }

    let mut graph_is_sound = true;
    for slide in &chapter.slides {
        if slide.next.is_some() && !slide.choices.is_empty() {
            problems.push(format!(
                "{label}: slide '{}' has both a next slide and choices",
                slide.key
            ));
        }
        for target in successors(slide) {
            if !slides.contains_key(target) {
                problems.push(format!(
                    "{label}: slide '{}' points at unknown slide '{target}'",
                    slide.key
                ));
                graph_is_sound = false;
            }
        }
        for word in &slide.vocabulary {
            if !words.contains(word.as_str()) {
                problems.push(format!(
                    "{label}: slide '{}' unlocks unknown vocabulary '{word}'",
                    slide.key
                ));
            }
        }
    }

    if graph_is_sound {
        check_graph(&label, chapter, &slides, problems);
    }
}

fn successors(slide: &SlideManifest) -> impl Iterator<Item = &str> {
    slide
        .next
        .iter()
        .chain(slide.choices.iter().filter_map(|c| c.next.as_ref()))
        .map(String::as_str)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first walk from the first slide: a back edge is a cycle, anything
/// never marked is unreachable.
fn check_graph(
    label: &str,
    chapter: &ChapterManifest,
    slides: &HashMap<&str, &SlideManifest>,
    problems: &mut Vec<String>,
) {
    let Some(start) = chapter.slides.first() else {
        return;
    };

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut stack: Vec<(&str, Vec<&str>)> = Vec::new();
    marks.insert(start.key.as_str(), Mark::InProgress);
    stack.push((start.key.as_str(), successors(start).collect()));

    while let Some((key, pending)) = stack.last_mut() {
        let Some(next) = pending.pop() else {
            marks.insert(*key, Mark::Done);
            stack.pop();
            continue;
        };
        match marks.get(next) {
            Some(Mark::InProgress) => {
                problems.push(format!("{label}: slides loop back to '{next}' from '{key}'"));
            }
            Some(Mark::Done) => {}
            None => {
                let Some(&slide) = slides.get(next) else {
                    continue;
                };
                marks.insert(next, Mark::InProgress);
                stack.push((next, successors(slide).collect()));
            }
        }
    }

    for slide in &chapter.slides {
        if !marks.contains_key(slide.key.as_str()) {
            problems.push(format!("{label}: slide '{}' is unreachable", slide.key));
        }
    }
}
