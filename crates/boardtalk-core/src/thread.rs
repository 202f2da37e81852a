use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::comment::Comment;

/// One task's comments partitioned into top-level comments and per-parent
/// reply buckets. Derived on every load, never stored.
#[derive(Debug, Clone, Default)]
pub struct Thread {
    pub roots: Vec<Comment>,
    pub replies_by_parent: HashMap<String, Vec<Comment>>,
}

impl Thread {
    pub fn replies(&self, parent_id: &str) -> &[Comment] {
        self.replies_by_parent
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total comments across roots and every reply bucket, orphaned buckets
    /// included.
    pub fn len(&self) -> usize {
        self.roots.len()
            + self
                .replies_by_parent
                .values()
                .map(Vec::len)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sort_key(comment: &Comment) -> DateTime<Utc> {
    comment.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Partitions a flat comment collection: comments without a parent reference
/// become roots, the rest go to their parent's bucket. Buckets whose parent
/// id matches no comment in the collection are kept but never walked by
/// rendering. Sorting is stable ascending by created_at with missing
/// timestamps first.
pub fn build_thread(comments: &[Comment]) -> Thread {
    let mut thread = Thread::default();
    for comment in comments {
        match &comment.parent_id {
            Some(parent_id) => thread
                .replies_by_parent
                .entry(parent_id.clone())
                .or_default()
                .push(comment.clone()),
            None => thread.roots.push(comment.clone()),
        }
    }
    thread.roots.sort_by_key(sort_key);
    for bucket in thread.replies_by_parent.values_mut() {
        bucket.sort_by_key(sort_key);
    }
    thread
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::comment::Author;

    fn author(id: &str) -> Author {
        Author {
            id: id.to_string(),
            handle: None,
            display_name: None,
        }
    }

    fn comment(id: &str, parent: Option<&str>, minute: Option<u32>) -> Comment {
        Comment {
            id: id.to_string(),
            task_id: "t1".to_string(),
            author: author("u1"),
            content: format!("comment {id}"),
            created_at: minute.map(|m| Utc.with_ymd_and_hms(2025, 6, 1, 12, m, 0).unwrap()),
            updated_at: None,
            parent_id: parent.map(|p| p.to_string()),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn empty_collection_builds_empty_thread() {
        let thread = build_thread(&[]);
        assert!(thread.is_empty());
        assert!(thread.roots.is_empty());
        assert!(thread.replies_by_parent.is_empty());
    }

    #[test]
    fn partitions_every_comment_exactly_once() {
        let comments = vec![
            comment("c1", None, Some(0)),
            comment("c2", Some("c1"), Some(1)),
            comment("c3", None, Some(2)),
            comment("c4", Some("c1"), Some(3)),
            comment("c5", Some("missing"), Some(4)),
        ];
        let thread = build_thread(&comments);
        assert_eq!(thread.len(), comments.len());
        assert_eq!(thread.roots.len(), 2);
        assert_eq!(thread.replies("c1").len(), 2);
        assert_eq!(thread.replies("missing").len(), 1);
    }

    #[test]
    fn reply_buckets_sorted_ascending_by_created_at() {
        let comments = vec![
            comment("c1", None, Some(0)),
            comment("late", Some("c1"), Some(30)),
            comment("early", Some("c1"), Some(5)),
            comment("mid", Some("c1"), Some(10)),
        ];
        let thread = build_thread(&comments);
        let ids: Vec<&str> = thread.replies("c1").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
        let times: Vec<_> = thread.replies("c1").iter().map(|c| c.created_at).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn missing_timestamp_sorts_first() {
        let comments = vec![
            comment("c1", None, Some(0)),
            comment("dated", Some("c1"), Some(1)),
            comment("undated", Some("c1"), None),
        ];
        let thread = build_thread(&comments);
        assert_eq!(thread.replies("c1")[0].id, "undated");
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let comments = vec![
            comment("c1", None, Some(0)),
            comment("first", Some("c1"), Some(7)),
            comment("second", Some("c1"), Some(7)),
            comment("third", Some("c1"), Some(7)),
        ];
        let thread = build_thread(&comments);
        let ids: Vec<&str> = thread.replies("c1").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn roots_sorted_ascending_by_created_at() {
        let comments = vec![
            comment("b", None, Some(20)),
            comment("a", None, Some(10)),
        ];
        let thread = build_thread(&comments);
        let ids: Vec<&str> = thread.roots.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn orphaned_replies_never_reach_roots() {
        let comments = vec![
            comment("c1", None, Some(0)),
            comment("orphan", Some("gone"), Some(1)),
        ];
        let thread = build_thread(&comments);
        assert_eq!(thread.roots.len(), 1);
        assert_eq!(thread.roots[0].id, "c1");
        assert_eq!(thread.replies("gone").len(), 1);
    }

    #[test]
    fn nested_chains_keep_each_level_in_its_bucket() {
        let comments = vec![
            comment("c1", None, Some(0)),
            comment("c2", Some("c1"), Some(1)),
            comment("c3", Some("c2"), Some(2)),
        ];
        let thread = build_thread(&comments);
        assert_eq!(thread.replies("c1").len(), 1);
        assert_eq!(thread.replies("c2").len(), 1);
        assert_eq!(thread.len(), 3);
    }
}
