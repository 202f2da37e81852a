use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::identity::Identity;

const MAX_KEY_POINTS: usize = 5;
const KEY_POINT_WIDTH: usize = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub decisions: Vec<String>,
    pub action_items: Vec<String>,
    pub unresolved_issues: Vec<String>,
    pub participants: Vec<String>,
    pub total_comments: usize,
}

/// Deterministic digest of one task's discussion. Stands in for the remote
/// summarization backend while keeping the full digest shape populated:
/// participants in order of first post, root first-lines as key points, and
/// marker lines ("decision:", "todo:"/"action:", trailing "?") sorted into
/// their buckets.
pub fn digest(comments: &[Comment], members: &[Identity]) -> ThreadSummary {
    let mut participants: Vec<String> = Vec::new();
    for comment in comments {
        let label = participant_label(comment, members);
        if !participants.contains(&label) {
            participants.push(label);
        }
    }

    let mut key_points = Vec::new();
    for comment in comments.iter().filter(|c| c.parent_id.is_none()) {
        if key_points.len() == MAX_KEY_POINTS {
            break;
        }
        if let Some(line) = first_line(&comment.content) {
            key_points.push(truncate(line, KEY_POINT_WIDTH));
        }
    }

    let mut decisions = Vec::new();
    let mut action_items = Vec::new();
    let mut unresolved_issues = Vec::new();
    for comment in comments {
        for line in comment.content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let lower = line.to_lowercase();
            if lower.starts_with("decision:") || lower.starts_with("decided:") {
                decisions.push(line.to_string());
            } else if lower.starts_with("todo:") || lower.starts_with("action:") {
                action_items.push(line.to_string());
            } else if line.ends_with('?') {
                unresolved_issues.push(line.to_string());
            }
        }
    }

    let roots = comments.iter().filter(|c| c.parent_id.is_none()).count();
    let summary = if comments.is_empty() {
        "No discussion on this task yet.".to_string()
    } else {
        format!(
            "{} comment{} from {} participant{} across {} top-level thread{}.",
            comments.len(),
            plural(comments.len()),
            participants.len(),
            plural(participants.len()),
            roots,
            plural(roots),
        )
    };

    ThreadSummary {
        summary,
        key_points,
        decisions,
        action_items,
        unresolved_issues,
        participants,
        total_comments: comments.len(),
    }
}

fn participant_label(comment: &Comment, members: &[Identity]) -> String {
    if comment.author.display_name.is_some() || comment.author.handle.is_some() {
        return comment.author.label().to_string();
    }
    members
        .iter()
        .find(|m| m.id == comment.author.id)
        .map(|m| m.display_name.clone())
        .unwrap_or_else(|| comment.author.id.clone())
}

fn first_line(content: &str) -> Option<&str> {
    content.lines().map(str::trim).find(|l| !l.is_empty())
}

fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        line.to_string()
    } else {
        let cut: String = line.chars().take(width).collect();
        format!("{cut}…")
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
