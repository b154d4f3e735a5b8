// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Interactive editing of a dashboard file. Every added or changed widget
//! is fetched and shown right away; the file is only written on save.

use std::fmt;
use std::path::Path;

use inquire::autocompletion::Replacement;
use inquire::{Confirm, CustomType, CustomUserError, InquireError, Select, Text};

use super::dashboard::print;
use super::prelude::*;
use crate::filters::{value_suggestions, AnalyticsFilters, FilterDraft, ANALYTICS_FIELDS, ANALYTICS_OPERATORS};
use crate::pages::dashboard::WidgetFetch;
use crate::pages::Dashboard;
use crate::query::suggest::LabelCache;
use crate::render::{filter_text, widgets};
use crate::types::{Aggregation, AnalyticsFilter, Interval, Operator};
use crate::widget::{
    Color, GaugeVariant, SeriesDisplay, WidgetConfig, WidgetDraft, WidgetType, COMMON_FIELDS,
};

const NO_FIELD: &str = "(none)";
const CUSTOM_FIELD: &str = "(other)";

const INTERVALS: [Interval; 5] = [
    Interval::Minute,
    Interval::Hour,
    Interval::Day,
    Interval::Week,
    Interval::Month,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Edit,
    Duplicate,
    Delete,
    Filters,
    Save,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Action::Add => "Add a widget",
            Action::Edit => "Edit a widget",
            Action::Duplicate => "Duplicate a widget",
            Action::Delete => "Delete a widget",
            Action::Filters => "Dashboard filters",
            Action::Save => "Save and exit",
            Action::Quit => "Exit without saving",
        })
    }
}

/// The widget actions are only offered when there are widgets.
fn actions(dashboard: &Dashboard) -> Vec<Action> {
    let mut actions = vec![Action::Add];
    if !dashboard.widgets().is_empty() {
        actions.extend([Action::Edit, Action::Duplicate, Action::Delete]);
    }
    actions.extend([Action::Filters, Action::Save, Action::Quit]);
    actions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterAction {
    Add,
    Remove(usize),
    Done,
}

impl FilterAction {
    /// Menu entries are "add", one "remove" per filter, then "done".
    fn from_index(index: usize, filters: usize) -> Self {
        match index {
            0 => FilterAction::Add,
            i if i <= filters => FilterAction::Remove(i - 1),
            _ => FilterAction::Done,
        }
    }
}

fn filter_options(filters: &[AnalyticsFilter]) -> Vec<String> {
    let mut options = vec!["Add a filter".to_string()];
    options.extend(filters.iter().map(|f| format!("Remove {}", filter_text(f))));
    options.push("Done".to_string());
    options
}

fn filter_action(message: &str, filters: &[AnalyticsFilter]) -> Result<FilterAction, InquireError> {
    let choice = Select::new(message, filter_options(filters)).raw_prompt()?;
    Ok(FilterAction::from_index(choice.index, filters.len()))
}

fn widget_label(widget: &WidgetConfig) -> String {
    let mut label = format!("{} ({}, {}", widget.title, widget.kind.name(), widget.aggregation.label());
    if let Some(field) = &widget.field {
        label.push_str(&format!(" of {field}"));
    }
    label.push(')');
    label
}

/// A menu entry that displays a label but yields a value.
struct Choice<T> {
    value: T,
    label: String,
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn select<T: Copy + PartialEq>(
    message: &str,
    values: &[T],
    current: T,
    label: impl Fn(&T) -> String,
) -> Result<T, InquireError> {
    let cursor = values.iter().position(|v| *v == current).unwrap_or(0);
    let choices: Vec<Choice<T>> = values
        .iter()
        .map(|v| Choice {
            value: *v,
            label: label(v),
        })
        .collect();
    Ok(Select::new(message, choices)
        .with_starting_cursor(cursor)
        .prompt()?
        .value)
}

/// Pick one of the common fields, or type another one. An empty string
/// means no field.
fn select_field(message: &str, current: &str, optional: bool) -> Result<String, InquireError> {
    let mut options: Vec<&str> = vec![];
    if optional {
        options.push(NO_FIELD);
    }
    options.extend(COMMON_FIELDS);
    options.push(CUSTOM_FIELD);
    let cursor = match current {
        "" => 0,
        field => options
            .iter()
            .position(|o| *o == field)
            .unwrap_or(options.len() - 1),
    };
    let choice = Select::new(message, options)
        .with_starting_cursor(cursor)
        .prompt()?;
    match choice {
        NO_FIELD => Ok(String::new()),
        CUSTOM_FIELD => Text::new(message).with_initial_value(current).prompt(),
        field => Ok(field.to_string()),
    }
}

/// Completes the value of a filter from the cached label values.
#[derive(Clone)]
struct ValueCompleter {
    values: Vec<String>,
}

impl inquire::Autocomplete for ValueCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let input = input.to_lowercase();
        Ok(self
            .values
            .iter()
            .filter(|v| v.to_lowercase().contains(&input))
            .cloned()
            .collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

fn prompt_filter(
    current: &FilterDraft,
    operators: &[Operator],
    labels: &LabelCache,
    with_names: bool,
) -> Result<FilterDraft, InquireError> {
    let fields: Vec<&str> = ANALYTICS_FIELDS.iter().map(|(field, _)| *field).collect();
    let field = select("Field:", &fields, current.field.as_str(), |field| {
        ANALYTICS_FIELDS
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| field.to_string())
    })?
    .to_string();
    let operator = select("Operator:", operators, current.operator, |op| {
        op.label().to_string()
    })?;
    let completer = ValueCompleter {
        values: value_suggestions(labels, &field, with_names).to_vec(),
    };
    let value = Text::new("Value:").with_autocomplete(completer).prompt()?;
    Ok(FilterDraft::new(&field, operator, &value))
}

/// The widget's own filters. Every operator is available here.
fn edit_widget_filters(draft: &mut WidgetDraft, labels: &LabelCache) -> Result<(), InquireError> {
    loop {
        match filter_action("Widget filters:", &draft.filters)? {
            FilterAction::Add => {
                draft.new_filter = prompt_filter(&draft.new_filter, &Operator::PARSE_ORDER, labels, true)?;
                if !draft.add_filter() {
                    warn!("Ignoring filter on {} without a value", draft.new_filter.field);
                }
            }
            FilterAction::Remove(index) => draft.remove_filter(index),
            FilterAction::Done => return Ok(()),
        }
    }
}

/// Filters applied to every widget of the dashboard while editing.
fn edit_dashboard_filters(filters: &mut AnalyticsFilters, labels: &LabelCache) -> Result<(), InquireError> {
    loop {
        match filter_action("Dashboard filters:", filters.filters())? {
            FilterAction::Add => {
                let draft = prompt_filter(&filters.draft, &ANALYTICS_OPERATORS, labels, false)?;
                filters.draft.field = draft.field;
                filters.draft.value = draft.value;
                filters.set_operator(draft.operator);
                if !filters.add() {
                    warn!("Ignoring filter without a value");
                }
            }
            FilterAction::Remove(index) => {
                if let Some(filter) = filters.remove(index) {
                    debug!("Removed dashboard filter {}", filter_text(&filter));
                }
            }
            FilterAction::Done => return Ok(()),
        }
    }
}

fn edit_draft(draft: &mut WidgetDraft, labels: &LabelCache) -> Result<(), InquireError> {
    if !draft.is_editing() {
        draft.widget_type = select("Widget type:", &WidgetType::ALL, draft.widget_type, |t| {
            format!("{:<11} {}", t.name(), t.description())
        })?;
    }
    draft.title = Text::new("Title:").with_initial_value(&draft.title).prompt()?;
    draft.aggregation = select("Aggregation:", &Aggregation::ALL, draft.aggregation, |a| {
        a.label().to_string()
    })?;
    draft.custom_field.clear();
    draft.field = if draft.needs_field() {
        select_field("Field:", &draft.field, false)?
    } else {
        String::new()
    };

    match draft.widget_type {
        WidgetType::Gauge => {
            let variants = [
                GaugeVariant::Default,
                GaugeVariant::Error,
                GaugeVariant::Success,
                GaugeVariant::Warning,
            ];
            draft.variant = select("Variant:", &variants, draft.variant, |v| format!("{v:?}"))?;
        }
        WidgetType::TimeSeries => {
            draft.interval = select("Interval:", &INTERVALS, draft.interval, |i| {
                i.as_str().to_string()
            })?;
            let displays = [SeriesDisplay::Chart, SeriesDisplay::Table];
            draft.display = select("Display:", &displays, draft.display, |d| format!("{d:?}"))?;
            draft.custom_group_by.clear();
            draft.group_by = select_field("Group by:", &draft.group_by, true)?;
            draft.fill_zeros = Confirm::new("Fill empty buckets with zeros?")
                .with_default(draft.fill_zeros)
                .prompt()?;
            let colors = [Color::Blue, Color::Red, Color::Green, Color::Amber];
            draft.color = select("Color:", &colors, draft.color, |c| format!("{c:?}"))?;
        }
        WidgetType::TopN => {
            draft.custom_group_by.clear();
            draft.group_by = select_field("Group by:", &draft.group_by, false)?;
            draft.limit = CustomType::<u32>::new("Limit:")
                .with_default(draft.limit)
                .prompt()?;
        }
        WidgetType::Compare => {
            draft.invert_colors = Confirm::new("Is a decrease the good outcome?")
                .with_default(draft.invert_colors)
                .prompt()?;
        }
    }

    edit_widget_filters(draft, labels)
}

/// Escape backs out of the current step without leaving the editor.
fn cancellable<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn pick_widget(dashboard: &Dashboard, message: &str) -> Result<Option<String>> {
    let choices: Vec<Choice<usize>> = dashboard
        .widgets()
        .iter()
        .enumerate()
        .map(|(i, w)| Choice {
            value: i,
            label: widget_label(w),
        })
        .collect();
    let choice = cancellable(Select::new(message, choices).prompt())?;
    Ok(choice.map(|c| dashboard.widgets()[c.value].id.clone()))
}

/// Run the draft through the form and build the widget. `None` if the
/// form was cancelled or the widget is invalid.
fn complete(mut draft: WidgetDraft, labels: &LabelCache) -> Result<Option<WidgetConfig>> {
    if cancellable(edit_draft(&mut draft, labels))?.is_none() {
        return Ok(None);
    }
    match draft.build() {
        Ok(widget) => Ok(Some(widget)),
        Err(err) => {
            warn!("{}", err);
            Ok(None)
        }
    }
}

async fn show<B: Backend + ?Sized>(dashboard: &mut Dashboard, backend: &B, fetch: WidgetFetch, style: Style) {
    let id = fetch.id.clone();
    dashboard.run(backend, fetch).await;
    if let Some(widget) = dashboard.widget(&id) {
        println!("{}", widgets::widget(widget, dashboard.state(&id), style));
    }
}

pub(super) async fn main(dashboard: &mut Dashboard, path: &Path, client: &Client, style: Style) -> Result<()> {
    let labels = LabelCache::load(client).await;
    if !dashboard.widgets().is_empty() {
        dashboard.refresh_all(client).await;
        print(dashboard, style);
    }

    loop {
        let Some(action) = cancellable(Select::new("Dashboard:", actions(dashboard)).prompt())? else {
            return Ok(());
        };
        let fetch = match action {
            Action::Add => match complete(WidgetDraft::default(), &labels)? {
                Some(widget) => dashboard.add(widget),
                None => None,
            },
            Action::Edit => {
                let Some(id) = pick_widget(dashboard, "Edit:")? else {
                    continue;
                };
                let Some(draft) = dashboard.widget(&id).map(WidgetDraft::from_widget) else {
                    continue;
                };
                match complete(draft, &labels)? {
                    Some(widget) => dashboard.update(widget),
                    None => None,
                }
            }
            Action::Duplicate => match pick_widget(dashboard, "Duplicate:")? {
                Some(id) => dashboard.duplicate(&id),
                None => None,
            },
            Action::Delete => {
                if let Some(id) = pick_widget(dashboard, "Delete:")? {
                    let confirmed = cancellable(Confirm::new("Delete this widget?").with_default(false).prompt())?;
                    if confirmed == Some(true) {
                        dashboard.delete(&id);
                    }
                }
                None
            }
            Action::Filters => {
                let _ = cancellable(edit_dashboard_filters(&mut dashboard.filters, &labels))?;
                dashboard.refresh_all(client).await;
                print(dashboard, style);
                None
            }
            Action::Save => {
                dashboard.save(path)?;
                return Ok(());
            }
            Action::Quit => return Ok(()),
        };
        if let Some(fetch) = fetch {
            show(dashboard, client, fetch, style).await;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::MockBackend;
    use crate::widget::WidgetKind;

    #[test]
    fn test_actions() {
        let mut dashboard = Dashboard::default();
        assert_eq!(
            actions(&dashboard),
            vec![Action::Add, Action::Filters, Action::Save, Action::Quit]
        );
        dashboard.add(WidgetDraft::new(WidgetType::Gauge).build().unwrap());
        assert!(actions(&dashboard).contains(&Action::Duplicate));
        assert_eq!(actions(&dashboard).len(), 7);
    }

    #[test]
    fn test_filter_menu() {
        let filters = vec![
            AnalyticsFilter::new("service", Operator::Eq, "users"),
            AnalyticsFilter::new("env", Operator::In, "prod,staging"),
        ];
        let options = filter_options(&filters);
        assert_eq!(options[1], "Remove service = users");
        assert_eq!(options[2], "Remove env in prod,staging");
        assert_eq!(FilterAction::from_index(0, 2), FilterAction::Add);
        assert_eq!(FilterAction::from_index(2, 2), FilterAction::Remove(1));
        assert_eq!(FilterAction::from_index(3, 2), FilterAction::Done);
        assert_eq!(FilterAction::from_index(1, 0), FilterAction::Done);
    }

    #[test]
    fn test_widget_label() {
        let mut draft = WidgetDraft::new(WidgetType::TopN);
        draft.title = "Slowest".to_string();
        draft.aggregation = Aggregation::P95;
        draft.field = "data.duration".to_string();
        let widget = draft.build().unwrap();
        assert_eq!(widget_label(&widget), "Slowest (topn, P95 of data.duration)");
        assert!(matches!(widget.kind, WidgetKind::TopN { .. }));
    }

    #[test]
    fn test_value_completer() {
        let mut completer = ValueCompleter {
            values: vec!["users".to_string(), "billing".to_string(), "User-Admin".to_string()],
        };
        assert_eq!(
            inquire::Autocomplete::get_suggestions(&mut completer, "user").unwrap(),
            vec!["users", "User-Admin"]
        );
    }

    #[test]
    fn test_cancellable() {
        assert_eq!(cancellable(Ok(1)).unwrap(), Some(1));
        assert_eq!(cancellable::<u32>(Err(InquireError::OperationCanceled)).unwrap(), None);
        assert!(cancellable::<u32>(Err(InquireError::OperationInterrupted)).is_err());
    }

    #[tokio::test]
    async fn test_show_fetches_one_widget() {
        let backend = MockBackend::default();
        backend.set_gauge(12.0);
        let mut dashboard = Dashboard::new(vec![WidgetDraft::new(WidgetType::Gauge).build().unwrap()]);
        let id = dashboard.widgets()[0].id.clone();
        let fetch = dashboard.duplicate(&id).unwrap();
        show(&mut dashboard, &backend, fetch, Style::PLAIN).await;
        assert_eq!(backend.calls(), vec!["gauge"]);
        assert_eq!(dashboard.widgets()[1].title, "gauge widget (Copy)");
    }
}
