#![forbid(unsafe_code)]

//! Rendering of both screens into a text frame.

use cardio_form::{Field, FieldKind};
use cardio_live::{ResultsView, SliderRow};
use cardio_runtime::{Emphasis, Frame};

use crate::app::{AppModel, Screen};

const TITLE: &str = " Cardiovascular Risk Assessment";
const LABEL_WIDTH: usize = 32;
const BAR_WIDTH: usize = 20;
/// Rows of the results screen outside the tip and slider lists: title,
/// result, three spacers, two headings, button, alert and hints.
const RESULTS_CHROME: usize = 10;
/// Sliders kept visible before tips get any room beyond their fair half.
const MIN_VISIBLE_SLIDERS: usize = 3;

const FORM_HINTS: &str =
    " Tab/\u{2191}\u{2193} field  \u{2190}\u{2192} choose  PgUp/PgDn panel  F1-F5 tab  Enter next  Ctrl+S submit  Ctrl+C quit";
const RESULTS_HINTS: &str =
    " \u{2191}\u{2193} slider  \u{2190}\u{2192}/wheel adjust  Enter/Ctrl+U update  Esc edit form  Ctrl+C quit";

/// Draw the model.
pub fn render(app: &AppModel, frame: &mut Frame) {
    frame.set_styled_line(0, TITLE, Emphasis::Bold);
    match app.screen() {
        Screen::Form => render_form(app, frame),
        Screen::Results => match app.results() {
            Some(view) => render_results(view, app.selected_row(), app.scroll(), frame),
            None => render_form(app, frame),
        },
    }
    let height = frame.height();
    if let Some(alert) = app.current_alert() {
        frame.set_styled_line(
            height.saturating_sub(2),
            &format!(" ! {alert}  [Enter]"),
            Emphasis::Reverse,
        );
    } else if app.is_predicting() {
        frame.set_styled_line(height.saturating_sub(2), " Predicting...", Emphasis::Dim);
    }
    let hints = match app.screen() {
        Screen::Form => FORM_HINTS,
        Screen::Results => RESULTS_HINTS,
    };
    frame.set_styled_line(height.saturating_sub(1), hints, Emphasis::Dim);
}

fn render_form(app: &AppModel, frame: &mut Frame) {
    let form = app.form();
    let strip: String = form
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            if tab.selected {
                format!("[F{} {}] ", i + 1, tab.title)
            } else {
                format!(" F{} {}  ", i + 1, tab.title)
            }
        })
        .collect();
    frame.set_line(1, &format!(" {strip}"));
    frame.set_line(2, &"\u{2500}".repeat(usize::from(frame.width())));

    let focused = form.focused().map(|f| f.name.as_str());
    let mut y = 3;
    for field in form.active_fields() {
        let is_focused = focused == Some(field.name.as_str());
        let emphasis = if field.disabled {
            Emphasis::Dim
        } else if is_focused {
            Emphasis::Reverse
        } else {
            Emphasis::Plain
        };
        frame.set_styled_line(y, &field_line(field, is_focused), emphasis);
        y += 1;
        if let Some(message) = field.error_message() {
            frame.set_styled_line(y, &format!("     ! {message}"), Emphasis::Bold);
            y += 1;
        }
    }
}

fn field_line(field: &Field, focused: bool) -> String {
    let cursor = if focused { '>' } else { ' ' };
    let mut label = field.label.clone();
    if field.required {
        label.push_str(" *");
    }
    let value = match &field.kind {
        _ if field.disabled => "(not applicable)".to_string(),
        FieldKind::Number { .. } => {
            let caret = if focused { "_" } else { "" };
            format!("[{}{caret}]", field.value)
        }
        FieldKind::Select { .. } => {
            format!("< {} >", field.selected_label().unwrap_or("choose"))
        }
    };
    format!(" {cursor} {label:<width$} {value}", width = LABEL_WIDTH)
}

/// Where the tip list and the slider window land on a frame of a given
/// height. Tips are capped first, then the sliders scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsLayout {
    /// Tips drawn in full.
    pub shown_tips: usize,
    /// Tips folded into a "more" line.
    pub hidden_tips: usize,
    /// Frame row of the first visible slider.
    pub slider_top: u16,
    /// Number of sliders that fit.
    pub visible_rows: usize,
    rows: usize,
}

impl ResultsLayout {
    pub fn new(view: &ResultsView, height: u16) -> Self {
        let tips = view.suggestions.as_ref().map_or(0, Vec::len);
        let rows = view.rows.len();
        let budget = usize::from(height).saturating_sub(RESULTS_CHROME);
        let reserved = rows.min((budget / 2).max(MIN_VISIBLE_SLIDERS));
        let tip_room = budget.saturating_sub(reserved).max(1);
        let (shown_tips, hidden_tips) = if tips <= tip_room {
            (tips, 0)
        } else {
            let shown = tip_room - 1;
            (shown, tips - shown)
        };
        let tip_lines = (shown_tips + usize::from(hidden_tips > 0)).max(1);
        let visible_rows = rows.min(budget.saturating_sub(tip_lines)).max(rows.min(1));
        Self {
            shown_tips,
            hidden_tips,
            slider_top: u16::try_from(6 + tip_lines).unwrap_or(u16::MAX),
            visible_rows,
            rows,
        }
    }

    /// First visible slider for a requested scroll offset.
    #[must_use]
    pub fn first_row(&self, scroll: usize) -> usize {
        scroll.min(self.rows.saturating_sub(self.visible_rows))
    }

    /// Scroll offset that keeps `selected` inside the window, moving it as
    /// little as possible from `scroll`.
    #[must_use]
    pub fn scroll_for(&self, selected: usize, scroll: usize) -> usize {
        let visible = self.visible_rows.max(1);
        let scroll = if selected < scroll {
            selected
        } else if selected >= scroll + visible {
            selected + 1 - visible
        } else {
            scroll
        };
        self.first_row(scroll)
    }

    /// Index of the slider drawn on frame row `y`.
    #[must_use]
    pub fn row_at(&self, scroll: usize, y: u16) -> Option<usize> {
        let offset = usize::from(y.checked_sub(self.slider_top)?);
        (offset < self.visible_rows).then(|| self.first_row(scroll) + offset)
    }
}

/// Index of the slider drawn on frame row `y` of a frame `height` rows tall.
pub fn slider_row_at(view: &ResultsView, height: u16, scroll: usize, y: u16) -> Option<usize> {
    ResultsLayout::new(view, height).row_at(scroll, y)
}

fn render_results(view: &ResultsView, selected: usize, scroll: usize, frame: &mut Frame) {
    let layout = ResultsLayout::new(view, frame.height());
    let result = view.result_text().filter(|t| !t.is_empty()).unwrap_or("-");
    frame.set_styled_line(1, &format!(" Result: {result}"), Emphasis::Bold);
    frame.set_line(3, " Suggestions:");
    let mut y = 4;
    match view.suggestions.as_deref() {
        Some(tips) if !tips.is_empty() => {
            for tip in tips.iter().take(layout.shown_tips) {
                frame.set_line(y, &format!("   \u{2022} {tip}"));
                y += 1;
            }
            if layout.hidden_tips > 0 {
                let more = format!("   \u{2026} {} more", layout.hidden_tips);
                frame.set_styled_line(y, &more, Emphasis::Dim);
                y += 1;
            }
        }
        _ => {
            frame.set_styled_line(y, "   (none)", Emphasis::Dim);
            y += 1;
        }
    }
    y += 1;
    let first = layout.first_row(scroll);
    let total = view.rows.len();
    if layout.visible_rows < total {
        let last = first + layout.visible_rows;
        frame.set_line(y, &format!(" What-if: ({}-{last} of {total})", first + 1));
    } else {
        frame.set_line(y, " What-if:");
    }
    y += 1;
    debug_assert_eq!(y, layout.slider_top);
    for (i, row) in view
        .rows
        .iter()
        .enumerate()
        .skip(first)
        .take(layout.visible_rows)
    {
        let emphasis = if i == selected {
            Emphasis::Reverse
        } else {
            Emphasis::Plain
        };
        frame.set_styled_line(y, &slider_line(row, i == selected), emphasis);
        y += 1;
    }
    y += 1;
    if let Some(button) = &view.button {
        let emphasis = if button.enabled {
            Emphasis::Bold
        } else {
            Emphasis::Dim
        };
        frame.set_styled_line(y, &format!(" [ {} ]", button.label), emphasis);
    }
}

fn slider_line(row: &SliderRow, selected: bool) -> String {
    let cursor = if selected { '>' } else { ' ' };
    let slider = &row.slider;
    let filled = (slider.fill_ratio() * BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "#".repeat(filled.min(BAR_WIDTH)),
        "-".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
    );
    let readout = row.readout().unwrap_or(&slider.value);
    format!(
        " {cursor} {title:<24} [{bar}] {readout:>7}  ({min} to {max})",
        title = row.title(),
        min = slider.effective_min(),
        max = slider.effective_max(),
    )
}
