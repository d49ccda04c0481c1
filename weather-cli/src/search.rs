//! Interactive city prompt with live suggestions.

use inquire::{
    CustomUserError, InquireError, Text,
    autocompletion::{Autocomplete, Replacement},
};
use tokio::runtime::Handle;
use weather_core::{PlaceQuery, SuggestClient, should_fetch};

/// Autocomplete source for the city prompt.
///
/// The prompt calls this synchronously on every keystroke, so lookups are
/// driven to completion on the runtime handle. The prompt itself must run
/// on a blocking thread (see [`prompt_city`]).
#[derive(Debug, Clone)]
pub struct CityCompleter {
    client: Option<SuggestClient>,
    runtime: Handle,
    options: Vec<String>,
}

impl CityCompleter {
    pub fn new(client: Option<SuggestClient>, runtime: Handle) -> Self {
        Self {
            client,
            runtime,
            options: Vec::new(),
        }
    }
}

impl Autocomplete for CityCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let Some(client) = &self.client else {
            return Ok(Vec::new());
        };

        if should_fetch(input, &self.options) {
            self.options = self.runtime.block_on(client.suggest(input));
        } else if input.chars().count() < 3 {
            self.options.clear();
        }

        Ok(self.options.clone())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

/// Ask for a city. `Ok(None)` means the user is done searching.
pub fn prompt_city(completer: CityCompleter) -> anyhow::Result<Option<PlaceQuery>> {
    let answer = Text::new("City:")
        .with_autocomplete(completer)
        .with_help_message("type 3+ letters for suggestions, enter to search, empty or esc to quit")
        .prompt();

    match answer {
        Ok(text) => Ok(PlaceQuery::parse_suggestion(&text)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
