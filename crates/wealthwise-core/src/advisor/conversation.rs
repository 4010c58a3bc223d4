//! Append-only advisor transcript

use serde::Serialize;

use super::ChatTurn;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    /// Set while a reply is being prepared
    pending: bool,
}

impl Conversation {
    /// Start a transcript with the given opening turn
    pub fn new(opening: ChatTurn) -> Self {
        Self {
            turns: vec![opening],
            pending: false,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record user input and mark a reply as pending
    pub(crate) fn begin(&mut self, input: &str) -> Result<()> {
        if input.trim().is_empty() {
            return Err(Error::Validation("Message cannot be empty".to_string()));
        }
        if self.pending {
            return Err(Error::Busy(
                "The advisor is still replying to your last message".to_string(),
            ));
        }
        self.turns.push(ChatTurn::user(input));
        self.pending = true;
        Ok(())
    }

    /// Append the reply and clear the pending flag
    pub(crate) fn finish(&mut self, reply: ChatTurn) -> ChatTurn {
        self.turns.push(reply.clone());
        self.pending = false;
        reply
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::ChatRole;

    fn opening() -> ChatTurn {
        ChatTurn::assistant("hi".to_string(), vec![])
    }

    #[test]
    fn test_begin_and_finish() {
        let mut c = Conversation::new(opening());
        c.begin("analyze").unwrap();
        assert!(c.is_pending());
        c.finish(ChatTurn::assistant("done".to_string(), vec![]));
        assert!(!c.is_pending());

        let roles: Vec<ChatRole> = c.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]);
    }

    #[test]
    fn test_rejects_empty_input() {
        let mut c = Conversation::new(opening());
        assert!(matches!(c.begin("   "), Err(Error::Validation(_))));
        assert_eq!(c.turns().len(), 1);
    }

    #[test]
    fn test_rejects_input_while_pending() {
        let mut c = Conversation::new(opening());
        c.begin("one").unwrap();
        assert!(matches!(c.begin("two"), Err(Error::Busy(_))));
        assert_eq!(c.turns().len(), 2);
    }
}
