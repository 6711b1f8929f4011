//! Scrolling, word-wrapped message log.

use crate::ecs::Color;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: Color,
}

impl Message {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Color::White)
    }
}

/// Keeps the last `height` wrapped lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    lines: VecDeque<Message>,
    width: usize,
    height: usize,
}

impl MessageLog {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(height),
            width: width.max(1),
            height,
        }
    }

    pub fn add(&mut self, message: Message) {
        for line in wrap(&message.text, self.width) {
            if self.lines.len() == self.height {
                self.lines.pop_front();
            }
            if self.height > 0 {
                self.lines.push_back(Message::new(line, message.color));
            }
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &Message> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(width)
                .map_or(word.len(), |(i, _)| i);
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap("The fireball explodes, burning everything", 16),
            vec!["The fireball", "explodes,", "burning", "everything"]
        );
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn oldest_lines_scroll_off() {
        let mut log = MessageLog::new(40, 2);
        log.add(Message::plain("one"));
        log.add(Message::plain("two"));
        log.add(Message::new("three", Color::Red));
        let texts: Vec<_> = log.lines().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(log.lines().last().map(|m| m.color), Some(Color::Red));
    }

    #[test]
    fn wrapped_lines_keep_color() {
        let mut log = MessageLog::new(10, 5);
        log.add(Message::new("You pick up the Healing Potion!", Color::LightBlue));
        assert_eq!(log.len(), 4);
        assert!(log.lines().all(|m| m.color == Color::LightBlue));
    }
}
