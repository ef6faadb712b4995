//! Parsing of the one-line commands accepted by the recipe type menu.

/// A command typed at the recipe type menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    /// Flip the type at this 0-based catalog index.
    Toggle(usize),
    EnableAll,
    DisableAll,
    /// Abandon the session without saving anything.
    Quit,
    Save,
    Invalid(String),
}

impl MenuCommand {
    /// Parse one line of input. Range checks happen at dispatch time.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "A" => MenuCommand::EnableAll,
            "D" => MenuCommand::DisableAll,
            "Q" => MenuCommand::Quit,
            "S" => MenuCommand::Save,
            _ => match trimmed.parse::<usize>() {
                Ok(index) => MenuCommand::Toggle(index),
                Err(_) => MenuCommand::Invalid(trimmed.to_string()),
            },
        }
    }
}
