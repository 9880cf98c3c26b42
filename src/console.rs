/*
 * @file console.rs
 * @brief Terminal chat surface for NutriGuide
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

//! Terminal chat surface.
//!
//! Stdout carries the transcript; logs go to stderr so the two never mix.

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::conversation::{Conversation, Role, Turn};

/// Reads submitted lines and renders turns.
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    /// Wraps the process's standard input.
    ///
    /// # Details
    /// Nothing is read until [`Console::read_line`] is awaited.
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prompts and waits for the next line; `None` at end of input.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "> ")?;
        stdout.flush()?;
        self.lines.next_line().await
    }

    /// Prints one turn with its speaker label, followed by a blank line.
    pub fn show_turn(&self, turn: &Turn) {
        println!("{}\n", render_turn(turn));
    }

    /// Prints every turn of `conversation` in order.
    pub fn show_transcript(&self, conversation: &Conversation) {
        for turn in conversation.turns() {
            self.show_turn(turn);
        }
    }

    /// Prints an indented status line that is not part of the transcript.
    pub fn notice(&self, message: &str) {
        println!("  {}", message);
    }
}

/// Formats a turn with a speaker label.
pub fn render_turn(turn: &Turn) -> String {
    let label = match turn.role() {
        Role::User => "You",
        Role::Assistant => "NutriGuide",
    };
    format!("{}: {}", label, turn.content())
}
