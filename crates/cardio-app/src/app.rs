#![forbid(unsafe_code)]

//! The client model: the patient form, then the results view.
//!
//! The form and the results view never share state; the model routes input
//! to whichever screen is showing and turns submissions and update requests
//! into background prediction tasks.

use std::sync::Arc;

use cardio_core::{
    Event, InputMap, KeyCode, KeyEvent, MouseEvent, PredictRequest, PredictResponse, input_value,
};
use cardio_form::schema::risk_form;
use cardio_form::{FormNavigator, FormValues, KeyDisposition};
use cardio_live::{LiveUpdater, PredictTransport, ResultsView, TransportError};
use cardio_runtime::{Cmd, Frame, Model};
use tracing::{debug, info, warn};

use crate::view;

/// Terminal height assumed until the first resize arrives.
const DEFAULT_HEIGHT: u16 = 24;

/// Which half of the client is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Results,
}

/// Client messages.
#[derive(Debug)]
pub enum Msg {
    Event(Event),
    /// The first prediction for a set of baseline inputs came back.
    Predicted {
        base: InputMap,
        outcome: Result<PredictResponse, TransportError>,
    },
    /// An update cycle's request came back. `generation` names the results
    /// view the request was made for.
    Updated {
        generation: u64,
        outcome: Result<PredictResponse, TransportError>,
    },
    /// Deferred re-normalization of a slider after a wheel step.
    Renormalize(usize),
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

/// Application state.
pub struct AppModel {
    form: FormNavigator,
    results: Option<ResultsView>,
    updater: LiveUpdater,
    transport: Arc<dyn PredictTransport>,
    screen: Screen,
    selected_row: usize,
    /// First slider shown in the results window.
    scroll: usize,
    /// Terminal rows, as last reported by a resize.
    height: u16,
    /// Bumped whenever a new results view is installed.
    generation: u64,
    /// Alerts raised outside the results view.
    alerts: Vec<String>,
    /// Baseline loaded at startup; predicted on `init`.
    preset_base: Option<InputMap>,
    predicting: bool,
}

impl AppModel {
    /// Fresh client talking to `transport`.
    pub fn new(transport: Arc<dyn PredictTransport>) -> Self {
        Self {
            form: risk_form(),
            results: None,
            updater: LiveUpdater::default(),
            transport,
            screen: Screen::Form,
            selected_row: 0,
            scroll: 0,
            height: DEFAULT_HEIGHT,
            generation: 0,
            alerts: Vec::new(),
            preset_base: None,
            predicting: false,
        }
    }

    /// Predict `base` as soon as the program starts, skipping the form.
    #[must_use]
    pub fn with_base_inputs(mut self, base: InputMap) -> Self {
        self.preset_base = Some(base);
        self
    }

    /// Open directly on an existing results view.
    #[must_use]
    pub fn with_results(mut self, view: ResultsView) -> Self {
        self.show_results(view);
        self
    }

    pub fn form(&self) -> &FormNavigator {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormNavigator {
        &mut self.form
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    /// First slider of the visible results window.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Whether the first prediction is still outstanding.
    pub fn is_predicting(&self) -> bool {
        self.predicting
    }

    pub fn updater(&self) -> &LiveUpdater {
        &self.updater
    }

    /// Oldest undismissed alert.
    pub fn current_alert(&self) -> Option<&str> {
        self.alerts
            .first()
            .or_else(|| self.results.as_ref()?.alerts().first())
            .map(String::as_str)
    }

    fn dismiss_alert(&mut self) {
        if self.alerts.is_empty() {
            if let Some(view) = self.results.as_mut() {
                view.dismiss_alert();
            }
        } else {
            self.alerts.remove(0);
        }
    }

    fn show_results(&mut self, view: ResultsView) {
        if self.updater.abandon() {
            debug!(generation = self.generation, "reply for the replaced view will be dropped");
        }
        self.generation += 1;
        self.results = Some(view);
        self.screen = Screen::Results;
        self.selected_row = 0;
        self.scroll = 0;
    }

    fn follow_selection(&mut self) {
        if let Some(view) = self.results.as_ref() {
            let layout = view::ResultsLayout::new(view, self.height);
            self.scroll = layout.scroll_for(self.selected_row, self.scroll);
        }
    }

    fn request_prediction(&mut self, base: InputMap) -> Cmd<Msg> {
        if self.predicting {
            return Cmd::none();
        }
        self.predicting = true;
        let transport = Arc::clone(&self.transport);
        let request = PredictRequest::new(base, InputMap::new());
        info!(inputs = request.base_inputs.len(), "requesting prediction");
        Cmd::task_named("predict", move || {
            let outcome = transport.predict(&request);
            Msg::Predicted {
                base: request.base_inputs,
                outcome,
            }
        })
    }

    fn submit(&mut self) -> Cmd<Msg> {
        match self.form.submit() {
            Ok(values) => self.request_prediction(base_inputs_from(&values)),
            Err(blocked) => {
                debug!(field = %blocked.field, panel = %blocked.panel, "submit blocked");
                Cmd::none()
            }
        }
    }

    fn start_update(&mut self) -> Cmd<Msg> {
        let Some(view) = self.results.as_mut() else {
            return Cmd::none();
        };
        match self.updater.begin(view) {
            Ok(request) => {
                let transport = Arc::clone(&self.transport);
                let generation = self.generation;
                Cmd::task_named("update", move || Msg::Updated {
                    generation,
                    outcome: transport.predict(&request),
                })
            }
            Err(err) => {
                debug!(%err, "update not started");
                Cmd::none()
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if !key.is_activation() {
            return Cmd::none();
        }
        if key.ctrl() && matches!(key.code, KeyCode::Char('c' | 'q')) {
            return Cmd::quit();
        }
        if self.current_alert().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Escape) {
                self.dismiss_alert();
            }
            return Cmd::none();
        }
        match self.screen {
            Screen::Form => self.on_form_key(key),
            Screen::Results => self.on_results_key(key),
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if self.form.handle_key(&key) != KeyDisposition::PassThrough {
            return Cmd::none();
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::PageDown => {
                self.form.next();
            }
            KeyCode::PageUp => {
                self.form.prev();
            }
            KeyCode::F(n) => {
                let target = usize::from(n)
                    .checked_sub(1)
                    .and_then(|i| self.form.panels().get(i))
                    .map(|p| p.id.clone());
                if let Some(id) = target {
                    self.form.show_panel(&id);
                }
            }
            KeyCode::Char('s') if key.ctrl() => return self.submit(),
            KeyCode::Enter => {
                if self.form.on_last_panel() {
                    return self.submit();
                }
                self.form.next();
            }
            KeyCode::Escape if self.results.is_some() => self.screen = Screen::Results,
            _ => {}
        }
        Cmd::none()
    }

    fn on_results_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        let Some(view) = self.results.as_mut() else {
            return Cmd::none();
        };
        let rows = view.rows.len();
        match key.code {
            KeyCode::Down | KeyCode::Tab if rows > 0 => {
                self.selected_row = (self.selected_row + 1) % rows;
            }
            KeyCode::Up | KeyCode::BackTab if rows > 0 => {
                self.selected_row = self.selected_row.checked_sub(1).unwrap_or(rows - 1);
            }
            KeyCode::Left | KeyCode::Right => {
                let direction = if key.code == KeyCode::Left { -1 } else { 1 };
                let ticks = if key.shift() { 10 } else { 1 };
                self.updater.nudge(view, self.selected_row, direction * ticks);
            }
            KeyCode::Char('u') if key.ctrl() => return self.start_update(),
            KeyCode::Enter => return self.start_update(),
            KeyCode::Escape => self.screen = Screen::Form,
            _ => {}
        }
        self.follow_selection();
        Cmd::none()
    }

    fn on_mouse(&mut self, mouse: MouseEvent) -> Cmd<Msg> {
        let Some(delta) = mouse.wheel_delta() else {
            return Cmd::none();
        };
        if self.screen != Screen::Results || self.current_alert().is_some() {
            return Cmd::none();
        }
        let Some(view) = self.results.as_mut() else {
            return Cmd::none();
        };
        let Some(row) = view::slider_row_at(view, self.height, self.scroll, mouse.y) else {
            return Cmd::none();
        };
        self.selected_row = row;
        if self.updater.wheel(view, row, delta) {
            Cmd::msg(Msg::Renormalize(row))
        } else {
            Cmd::none()
        }
    }
}

impl Model for AppModel {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        match self.preset_base.take() {
            Some(base) => self.request_prediction(base),
            None => Cmd::none(),
        }
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Event(Event::Key(key)) => self.on_key(key),
            Msg::Event(Event::Mouse(mouse)) => self.on_mouse(mouse),
            Msg::Event(Event::Resize { height, .. }) => {
                self.height = height;
                self.follow_selection();
                Cmd::none()
            }
            Msg::Predicted { base, outcome } => {
                self.predicting = false;
                match outcome {
                    Ok(response) => {
                        let view = ResultsView::from_response(
                            &response,
                            Some(base),
                            self.updater.normalizer(),
                        );
                        info!(sliders = view.rows.len(), "prediction received");
                        self.show_results(view);
                    }
                    Err(err) => {
                        warn!(error = %err, "prediction failed");
                        self.alerts.push(format!("Prediction failed: {err}"));
                    }
                }
                Cmd::none()
            }
            Msg::Updated {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "stale update reply dropped");
                    return Cmd::none();
                }
                if let Some(view) = self.results.as_mut()
                    && let Err(err) = self.updater.finish(view, outcome)
                {
                    debug!(%err, "update cycle ended with an error");
                }
                Cmd::none()
            }
            Msg::Renormalize(row) => {
                if let Some(view) = self.results.as_mut() {
                    self.updater.slider_input(view, row);
                }
                Cmd::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame) {
        view::render(self, frame);
    }
}

/// Submitted form values as baseline inputs. Numeric text becomes a JSON
/// number.
pub fn base_inputs_from(values: &FormValues) -> InputMap {
    values
        .iter()
        .map(|(name, value)| (name.clone(), input_value(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Offline;

    impl PredictTransport for Offline {
        fn predict(&self, _: &PredictRequest) -> Result<PredictResponse, TransportError> {
            Err(TransportError::Http("offline".into()))
        }
    }

    #[test]
    fn base_inputs_convert_numbers() {
        let values = FormValues::from([
            ("age".to_string(), "54".to_string()),
            ("BMI".to_string(), "27.5".to_string()),
        ]);
        let base = base_inputs_from(&values);
        assert_eq!(base["age"], json!(54));
        assert_eq!(base["BMI"], json!(27.5));
    }

    #[test]
    fn starts_on_form() {
        let app = AppModel::new(Arc::new(Offline));
        assert_eq!(app.screen(), Screen::Form);
        assert!(app.results().is_none());
        assert!(app.current_alert().is_none());
    }

    #[test]
    fn failed_prediction_raises_alert() {
        let mut app = AppModel::new(Arc::new(Offline));
        app.update(Msg::Predicted {
            base: InputMap::new(),
            outcome: Err(TransportError::Status(503)),
        });
        assert!(app.current_alert().unwrap().contains("503"));
        assert_eq!(app.screen(), Screen::Form);
        app.update(Msg::Event(Event::key(KeyCode::Enter)));
        assert!(app.current_alert().is_none());
    }
}
