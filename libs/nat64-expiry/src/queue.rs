use std::collections::HashMap;
use std::time::Instant;

use nat64_session::SessionId;

struct Node {
    prev: Option<SessionId>,
    next: Option<SessionId>,
    deadline: Instant,
}

/// A single FIFO expiry queue: an intrusive doubly-linked list keyed by
/// `SessionId`, so a session can be unlinked from wherever it sits in O(1)
/// without scanning.
///
/// Deadlines are monotonic from head to tail by construction: every entry
/// on one queue shares the same timeout and is always appended at the
/// tail, so an entry can never be inserted behind one with an earlier
/// deadline.
#[derive(Default)]
pub struct ExpiryQueue {
    nodes: HashMap<SessionId, Node>,
    head: Option<SessionId>,
    tail: Option<SessionId>,
}

impl ExpiryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, session: SessionId) -> bool {
        self.nodes.contains_key(&session)
    }

    /// Appends `session` to the tail with `deadline`. Assumes `session` is
    /// not already enqueued here.
    pub fn push_back(&mut self, session: SessionId, deadline: Instant) {
        let node = Node {
            prev: self.tail,
            next: None,
            deadline,
        };

        if let Some(old_tail) = self.tail {
            if let Some(old_tail_node) = self.nodes.get_mut(&old_tail) {
                old_tail_node.next = Some(session);
            }
        } else {
            self.head = Some(session);
        }

        self.tail = Some(session);
        self.nodes.insert(session, node);
    }

    /// Unlinks `session` from wherever it sits in the list. O(1).
    pub fn remove(&mut self, session: SessionId) -> bool {
        let Some(node) = self.nodes.remove(&session) else {
            return false;
        };

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.nodes.get_mut(&prev) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }

        match node.next {
            Some(next) => {
                if let Some(next_node) = self.nodes.get_mut(&next) {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        true
    }

    /// The head's session and deadline, without removing it.
    #[must_use]
    pub fn peek_front(&self) -> Option<(SessionId, Instant)> {
        let head = self.head?;
        self.nodes.get(&head).map(|n| (head, n.deadline))
    }

    /// Removes and returns the head.
    pub fn pop_front(&mut self) -> Option<SessionId> {
        let head = self.head?;
        self.remove(head);
        Some(head)
    }
}
