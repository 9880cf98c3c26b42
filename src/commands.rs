/*
 * @file commands.rs
 * @brief Console command parsing for the chat surface
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

//! Console command parsing.
//!
//! Lines starting with `/` are control commands; anything else is a chat
//! message for the model.

use std::path::PathBuf;

use crate::prompt::ProfileField;

/// Phrases that end the session when spoken.
const QUIT_PHRASES: [&str; 4] = ["quit", "exit", "goodbye", "bye"];

/// One parsed line of console input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// A question for the model.
    Chat(String),
    /// Attach an image to the next submission.
    Attach(PathBuf),
    /// Drop the pending attachment.
    Detach,
    /// Capture a spoken question.
    Microphone,
    /// Reset the transcript to the greeting.
    Clear,
    /// Set (or, with empty text, clear) a profile field.
    SetProfile(ProfileField, String),
    /// Show the current profile.
    ShowProfile,
    /// Reprint the transcript.
    History,
    Help,
    Quit,
    /// Blank input.
    Empty,
    /// A `/command` that is not recognized, or is missing its argument.
    Invalid(String),
}

/// Help text listing every console command.
pub const HELP: &str = "\
Commands:
  /image <path>      attach a meal photo or nutrition label (jpg, jpeg, png) to the next message
  /detach            drop the attached image
  /mic               ask a question out loud
  /health <text>     set health conditions or goals (empty to clear)
  /fitness <text>    set fitness info
  /prefs <text>      set food preferences or restrictions
  /feedback <text>   set feedback on earlier advice
  /profile           show the current profile
  /history           show the conversation so far
  /clear             clear the chat
  /help              show this help
  /quit              leave NutriGuide
Anything else is sent to NutriGuide as a question.";

/// Parses one line of console input.
pub fn parse_input(line: &str) -> ConsoleCommand {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ConsoleCommand::Chat(line.to_string());
    };
    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };
    match name.to_ascii_lowercase().as_str() {
        "image" | "attach" if argument.is_empty() => {
            ConsoleCommand::Invalid("/image needs a file path".to_string())
        }
        "image" | "attach" => ConsoleCommand::Attach(PathBuf::from(argument)),
        "detach" => ConsoleCommand::Detach,
        "mic" | "microphone" => ConsoleCommand::Microphone,
        "clear" => ConsoleCommand::Clear,
        "health" => ConsoleCommand::SetProfile(ProfileField::Health, argument.to_string()),
        "fitness" => ConsoleCommand::SetProfile(ProfileField::Fitness, argument.to_string()),
        "prefs" | "preferences" => {
            ConsoleCommand::SetProfile(ProfileField::Preferences, argument.to_string())
        }
        "feedback" => ConsoleCommand::SetProfile(ProfileField::Feedback, argument.to_string()),
        "profile" => ConsoleCommand::ShowProfile,
        "history" => ConsoleCommand::History,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => ConsoleCommand::Invalid(format!("unknown command /{}", other)),
    }
}

/// Whether a spoken utterance asks to leave.
///
/// # Details
/// The whole utterance must be a quit phrase once case, surrounding
/// punctuation and extra whitespace are dropped. A question that merely
/// contains one, such as "How can I quit sugar?", is not a quit request.
///
/// # Arguments
/// * `text` - The transcribed utterance.
///
/// # Returns
/// `true` when the session should end.
pub fn is_quit_phrase(text: &str) -> bool {
    let lowered = text.to_lowercase();
    let normalized = lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let normalized = normalized.trim_matches(|c: char| !c.is_alphanumeric());
    QUIT_PHRASES.contains(&normalized)
}
