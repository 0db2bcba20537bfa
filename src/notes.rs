//! Free-form notes pad.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    text: String,
}

impl Notes {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn update(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Removes the last character, if any.
    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
