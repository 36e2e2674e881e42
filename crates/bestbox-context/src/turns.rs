//! Grouping a flat message history into turn-shaped chunks.

use bestbox_core::model::{Message, MessageRole};

/// Split `history` into contiguous groups, each starting at a `user`
/// message and running up to (but not including) the next `user` message.
/// Any messages preceding the first `user` message (e.g. a leading system
/// digest already present from a prior compaction) form their own leading
/// group so they are never silently merged into the first real turn.
#[must_use]
pub fn group_into_turns(history: &[Message]) -> Vec<Vec<Message>> {
    let mut groups: Vec<Vec<Message>> = Vec::new();
    for message in history {
        let starts_new_group = matches!(message.role, MessageRole::User) || groups.is_empty();
        if starts_new_group {
            groups.push(vec![message.clone()]);
        } else {
            groups.last_mut().expect("just checked non-empty").push(message.clone());
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_split_on_user_messages() {
        let history = vec![
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
            Message::assistant("a2"),
        ];
        let groups = group_into_turns(&history);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 2);
    }

    #[test]
    fn empty_history_yields_no_groups() {
        assert!(group_into_turns(&[]).is_empty());
    }
}
