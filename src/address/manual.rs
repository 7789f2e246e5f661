use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use crate::domain::Address;

/// Questions asked of the operator
pub trait Prompter {
    /// Free text answer, possibly empty.
    fn text(&mut self, prompt: &str) -> io::Result<String>;

    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;

    fn note(&mut self, message: &str);
}

/// Prompts on the terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, prompt: &str) -> io::Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)?;
        Ok(answer.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(io::Error::other)
    }

    fn note(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Ask the operator where an event takes place.
///
/// Returns `Ok(None)` when no venue name is given. An online answer skips
/// the postal questions.
pub fn prompt_location(prompter: &mut dyn Prompter, venue_name: Option<&str>) -> io::Result<Option<Address>> {
    let name = match venue_name {
        Some(name) => {
            prompter.note(&format!("\nPlease provide location details for: {}", name));
            name.to_string()
        }
        None => {
            prompter.note("\nNo location found on the event page.");
            prompter.text("Venue name (blank to skip)")?
        }
    };
    if name.is_empty() {
        return Ok(None);
    }

    if prompter.confirm("Is this an online event?")? {
        return Ok(Some(Address::online(name)));
    }

    let street = prompter.text("Street address")?;
    let city = prompter.text("City")?;
    let state = prompter.text("State (2-letter code)")?.to_uppercase();
    let zip = prompter.text("ZIP code")?;

    Ok(Some(Address::physical(name, street, city, state, zip)))
}
