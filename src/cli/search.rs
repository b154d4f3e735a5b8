// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Interactive event search: filters are typed one at a time at a prompt
//! with autocompletion and collected as chips.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use inquire::autocompletion::{Autocomplete, Replacement};
use inquire::{CustomUserError, InquireError, Text};
use tokio::runtime::Handle;

use super::events::print_page;
use super::prelude::*;
use crate::filters::{EventQuery, DEFAULT_LIMIT, LIMIT_CHOICES};
use crate::pages::EventsPage;
use crate::query::{
    format_expression, parse_input, InputEvent, Key, QueryChip, QueryInput, Suggestion,
    SuggestionKind,
};
use crate::render::Tone;

const HELP: &str = r#"Type a filter such as "service = users" and press Enter to add it.
Enter on an empty line runs the search. Tab completes the highlighted suggestion.

  :pop        remove the last filter
  :rm N       remove filter N
  :edit N     edit filter N
  :clear      remove all filters
  :limit N    show N events per page (25, 50, 100, 250 or 500)
  :next       next page
  :prev       previous page
  :quit       exit"#;

#[derive(Debug, Parser)]
pub struct Args {
    /// Only events of this level
    #[arg(short, long)]
    level: Option<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    Pop,
    Clear,
    Edit(usize),
    Remove(usize),
    Limit(u32),
    Next,
    Previous,
    Help,
}

impl std::str::FromStr for Command {
    type Err = String;

    /// Chip numbers are 1-based at the prompt.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().trim_start_matches(':').split_whitespace();
        let name = parts.next().unwrap_or_default();
        let index = |arg: Option<&str>| {
            arg.and_then(|a| a.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .map(|n| n - 1)
                .ok_or_else(|| format!(":{name} needs a filter number"))
        };
        match name {
            "q" | "quit" => Ok(Command::Quit),
            "pop" => Ok(Command::Pop),
            "clear" => Ok(Command::Clear),
            "e" | "edit" => Ok(Command::Edit(index(parts.next())?)),
            "rm" => Ok(Command::Remove(index(parts.next())?)),
            "limit" => parts
                .next()
                .and_then(|arg| arg.parse::<u32>().ok())
                .filter(|n| LIMIT_CHOICES.contains(n))
                .map(Command::Limit)
                .ok_or_else(|| format!(":limit takes one of {LIMIT_CHOICES:?}")),
            "n" | "next" => Ok(Command::Next),
            "p" | "prev" => Ok(Command::Previous),
            "h" | "help" | "?" => Ok(Command::Help),
            _ => Err(format!("unknown command: {}", s.trim())),
        }
    }
}

fn suggestion_line(suggestion: &Suggestion) -> String {
    match &suggestion.description {
        Some(description) => format!("{:<11} {}", suggestion.display, description),
        None => suggestion.display.clone(),
    }
}

/// Drives a private copy of the query input from the prompt. Runs on the
/// prompt's blocking thread and reaches the backend through the runtime
/// handle.
#[derive(Clone)]
struct Completer {
    input: Arc<Mutex<QueryInput>>,
    shown: Arc<Mutex<Vec<Suggestion>>>,
    backend: Arc<dyn Backend>,
    handle: Handle,
}

impl Completer {
    fn new(source: &QueryInput, backend: Arc<dyn Backend>, handle: Handle) -> Self {
        let mut input = QueryInput::with_chips(source.chips().to_vec());
        input.set_labels(source.suggester().labels.clone());
        input.set_data_keys(source.suggester().data_keys.clone());
        Self {
            input: Arc::new(Mutex::new(input)),
            shown: Arc::default(),
            backend,
            handle,
        }
    }

    fn input(&self) -> Result<MutexGuard<'_, QueryInput>, CustomUserError> {
        self.input.lock().map_err(|_| "query input lock poisoned".into())
    }

    fn shown(&self) -> Result<MutexGuard<'_, Vec<Suggestion>>, CustomUserError> {
        self.shown.lock().map_err(|_| "suggestion lock poisoned".into())
    }

    fn chips(&self) -> Result<Vec<QueryChip>, CustomUserError> {
        Ok(self.input()?.chips().to_vec())
    }

    fn text(&self) -> Result<String, CustomUserError> {
        Ok(self.input()?.text().to_string())
    }

    fn suggest(&self, text: &str) -> Result<Vec<Suggestion>, CustomUserError> {
        let mut input = self.input()?;
        if let InputEvent::FetchValues(request) = input.set_text(text) {
            // The prompt asks once per keystroke and waits for the answer,
            // so the lookup runs without a debounce.
            let response = self
                .handle
                .block_on(request.run(self.backend.as_ref(), Duration::ZERO));
            if let Some(response) = response {
                input.apply_values(response);
            }
        }
        Ok(input.visible_suggestions())
    }

    fn find_shown(&self, line: &str) -> Result<Option<Suggestion>, CustomUserError> {
        Ok(self
            .shown()?
            .iter()
            .find(|s| suggestion_line(s) == line)
            .cloned())
    }

    /// Apply a submitted line to the input. The prompt may submit a
    /// highlighted suggestion in place of the typed text.
    fn submit(&self, answer: &str) -> Result<InputEvent, CustomUserError> {
        let suggestion = self.find_shown(answer)?;
        let mut input = self.input()?;
        if let Some(suggestion) = suggestion {
            if input.text() != answer {
                return Ok(input.select_suggestion(&suggestion));
            }
        }
        input.set_text(answer);
        input.click_outside();
        Ok(input.handle_key(Key::Enter))
    }
}

impl Autocomplete for Completer {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let suggestions = self.suggest(input)?;
        let lines = suggestions.iter().map(suggestion_line).collect();
        *self.shown()? = suggestions;
        Ok(lines)
    }

    fn get_completion(
        &mut self,
        input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        let Some(suggestion) = highlighted_suggestion
            .map(|line| self.find_shown(&line))
            .transpose()?
            .flatten()
        else {
            return Ok(None);
        };
        if suggestion.kind == SuggestionKind::Value {
            return Ok(parse_input(input)
                .map(|expr| format_expression(&expr.key, expr.operator, &suggestion.value)));
        }
        let mut state = self.input()?;
        state.set_text(input);
        state.select_suggestion(&suggestion);
        Ok(Some(state.text().to_string()))
    }
}

fn print_chips(input: &QueryInput, style: Style) {
    if input.chips().is_empty() {
        return;
    }
    let chips: Vec<String> = input
        .chips()
        .iter()
        .enumerate()
        .map(|(i, chip)| format!("{} {}", style.paint(&format!("[{}]", i + 1), Tone::Muted), chip))
        .collect();
    println!("{}", chips.join("  "));
}

async fn search(page: &mut EventsPage, backend: &dyn Backend, style: Style) {
    if page.refresh(backend).await {
        print_page(page, false, style);
    } else if let Some(err) = page.error() {
        println!("{}", style.paint(err, Tone::Red));
    }
}

/// Returns text to put back into the prompt.
async fn run_command(
    page: &mut EventsPage,
    command: Command,
    backend: &dyn Backend,
    style: Style,
) -> Option<String> {
    if let Command::Next | Command::Previous = command {
        let moved = if command == Command::Next {
            page.next_page()
        } else {
            page.previous_page()
        };
        if moved {
            search(page, backend, style).await;
        } else {
            warn!("No more pages");
        }
        return None;
    }

    if let Command::Limit(limit) = command {
        page.filters.set_limit(limit);
        page.filters.set_offset(0);
        search(page, backend, style).await;
        return None;
    }

    let input = &mut page.filters.input;
    let event = match command {
        Command::Help => {
            println!("{}", HELP);
            InputEvent::None
        }
        Command::Pop => match input.chips().len() {
            0 => InputEvent::None,
            n => input.remove_chip(n - 1),
        },
        Command::Remove(index) => input.remove_chip(index),
        Command::Clear => {
            input.set_chips(vec![]);
            InputEvent::ChipsChanged
        }
        Command::Edit(index) => input.click_chip(index),
        Command::Quit | Command::Limit(_) | Command::Next | Command::Previous => InputEvent::None,
    };
    let text = input.text().to_string();
    if page.filters.handle(&event) {
        page.filters.set_offset(0);
        search(page, backend, style).await;
    }
    (!text.is_empty()).then_some(text)
}

pub async fn main(args: Args, client: Client) -> Result<()> {
    let backend: Arc<dyn Backend> = Arc::new(client);
    let mut page = EventsPage::new(EventQuery {
        level: args.level,
        limit: args.limit,
        ..Default::default()
    });
    page.filters.input.load_labels(backend.as_ref()).await;
    let style = Style::detect();
    println!("{}", style.paint(HELP, Tone::Muted));

    let mut initial = String::new();
    loop {
        page.filters
            .input
            .sync_data_keys(backend.as_ref())
            .await;
        print_chips(&page.filters.input, style);

        let completer = Completer::new(&page.filters.input, backend.clone(), Handle::current());
        let prompt_completer = completer.clone();
        let text = std::mem::take(&mut initial);
        let answer = tokio::task::spawn_blocking(move || {
            Text::new("Filter:")
                .with_initial_value(&text)
                .with_autocomplete(prompt_completer)
                .prompt()
        })
        .await?;
        let answer = match answer {
            Ok(answer) => answer,
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        if answer.trim_start().starts_with(':') {
            match answer.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    if let Some(text) = run_command(&mut page, command, backend.as_ref(), style).await {
                        initial = text;
                    }
                }
                Err(err) => warn!("{}", err),
            }
            continue;
        }

        let event = completer.submit(&answer).map_err(|err| anyhow!(err))?;
        match event {
            InputEvent::ChipsChanged => {
                let chips = completer.chips().map_err(|err| anyhow!(err))?;
                page.filters.input.set_chips(chips);
                page.filters.handle(&event);
                page.filters.set_offset(0);
                search(&mut page, backend.as_ref(), style).await;
            }
            InputEvent::Search => search(&mut page, backend.as_ref(), style).await,
            InputEvent::None | InputEvent::FetchValues(_) => {
                if parse_input(&answer).is_some() {
                    warn!("Incomplete or duplicate filter: {}", answer.trim());
                }
            }
        }
        initial = completer.text().map_err(|err| anyhow!(err))?;
    }
    Ok(())
}
