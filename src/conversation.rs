/*
 * @file conversation.rs
 * @brief In-memory chat transcript for one NutriGuide session
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Conversation log.
//!
//! The log is append-only apart from a bulk [`Conversation::clear`], which
//! reseeds it with the greeting. It lives only as long as the session that
//! owns it. Appends are not synchronized: the runtime handles one submission
//! at a time, and concurrent submissions would have to serialize them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Greeting shown at the start of every conversation.
pub const GREETING: &str =
    "Hi! I'm NutriGuide 🥗. Ask me anything about healthy eating or upload a food image.";

/// Speaker of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Creates a turn spoken by the user.
    ///
    /// # Arguments
    /// * `content` - Typed text, a transcribed utterance, or an image marker
    ///   such as `[image: lunch.jpg]`.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a turn spoken by NutriGuide: a model answer or an error string.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Who produced this turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Text of the turn, exactly as recorded.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered transcript of turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Creates a conversation holding only the greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(GREETING)],
        }
    }

    /// Appends a turn at the end of the transcript.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drops every turn and reseeds the greeting.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::assistant(GREETING));
    }

    /// All turns, oldest first. The first is always the greeting.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns including the greeting.
    ///
    /// # Returns
    /// At least 1; each successful submission adds exactly 2.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false; a conversation holds at least the greeting.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
