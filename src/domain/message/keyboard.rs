//! Custom reply keyboards.
//!
//! A keyboard is what the user sees as tappable buttons, and it doubles as
//! the set of literal inputs a step accepts by default.

use serde::{Deserialize, Serialize};

/// Rows of button labels presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keyboard {
    rows: Vec<Vec<String>>,
}

impl Keyboard {
    /// Creates an empty keyboard. Add rows with [`Keyboard::row`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row of buttons.
    pub fn row<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(buttons.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the rows of button labels.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Iterates over every button label, row by row.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }

    /// Returns true if some button's label equals `input` exactly.
    pub fn contains(&self, input: &str) -> bool {
        self.labels().any(|label| label == input)
    }

    /// Returns true if the keyboard has no buttons at all.
    pub fn is_empty(&self) -> bool {
        self.labels().next().is_none()
    }
}
