#![forbid(unsafe_code)]

//! The patient form: panels, fields and their constraints.
//!
//! Field names are the names the prediction service expects in a form post.

use crate::field::{Field, SelectOption};
use crate::navigator::{FieldDependency, FormNavigator};
use crate::panel::PanelSpec;

/// Trigger of the cigarettes dependency.
pub const SMOKER_FIELD: &str = "currentSmoker";
/// Field enabled only for current smokers.
pub const CIGARETTES_FIELD: &str = "cigsPerDay";

fn yes_no(name: &str, label: &str) -> Field {
    Field::select(
        name,
        label,
        vec![SelectOption::new("0", "No"), SelectOption::new("1", "Yes")],
    )
    .required()
}

fn choice(name: &str, label: &str, options: &[(&str, &str)]) -> Field {
    Field::select(
        name,
        label,
        options
            .iter()
            .map(|(v, l)| SelectOption::new(*v, *l))
            .collect(),
    )
    .required()
}

fn measure(name: &str, label: &str, min: f64, max: f64) -> Field {
    Field::number(name, label).bounds(min, max).required()
}

/// Panel declarations of the cardiovascular risk form, in document order.
pub fn risk_form_panels() -> Vec<PanelSpec> {
    vec![
        PanelSpec::new(
            "personal",
            "Personal",
            vec![
                measure("age", "Age (years)", 18.0, 100.0),
                choice("sex", "Sex", &[("1", "Male"), ("0", "Female")]),
                choice(
                    "education",
                    "Education",
                    &[
                        ("1", "Some high school"),
                        ("2", "High school / GED"),
                        ("3", "Some college"),
                        ("4", "College degree"),
                    ],
                ),
            ],
        ),
        PanelSpec::new(
            "lifestyle",
            "Lifestyle",
            vec![
                yes_no(SMOKER_FIELD, "Current smoker"),
                Field::number(CIGARETTES_FIELD, "Cigarettes per day").bounds(0.0, 70.0),
                measure("BMI", "Body mass index", 10.0, 60.0).step(0.01),
            ],
        ),
        PanelSpec::new(
            "history",
            "History",
            vec![
                yes_no("BPMeds", "On blood pressure medication"),
                yes_no("prevalentStroke", "Previous stroke"),
                yes_no("prevalentHyp", "Hypertensive"),
                yes_no("diabetes", "Diabetes"),
            ],
        ),
        PanelSpec::new(
            "vitals",
            "Vitals",
            vec![
                measure("heartRate", "Heart rate (bpm)", 30.0, 220.0),
                measure("sysBP", "Systolic BP (mmHg)", 80.0, 300.0).step(0.5),
                measure("diaBP", "Diastolic BP (mmHg)", 40.0, 200.0).step(0.5),
                measure("totChol", "Total cholesterol (mg/dL)", 100.0, 700.0),
                measure("restingBpS", "Resting BP (mmHg)", 80.0, 200.0),
                measure("maxHeartRate", "Max heart rate achieved", 60.0, 220.0),
                measure("cholesterol", "Serum cholesterol (mg/dL)", 0.0, 700.0),
            ],
        ),
        PanelSpec::new(
            "cardiac",
            "Cardiac tests",
            vec![
                choice(
                    "chestPainType",
                    "Chest pain type",
                    &[
                        ("1", "Typical angina"),
                        ("2", "Atypical angina"),
                        ("3", "Non-anginal pain"),
                        ("4", "Asymptomatic"),
                    ],
                ),
                yes_no("fastingBloodSugar", "Fasting blood sugar > 120 mg/dL"),
                choice(
                    "restingEcg",
                    "Resting ECG",
                    &[
                        ("0", "Normal"),
                        ("1", "ST-T abnormality"),
                        ("2", "LV hypertrophy"),
                    ],
                ),
                yes_no("exerciseAngina", "Exercise-induced angina"),
                measure("oldpeak", "ST depression (oldpeak)", -3.0, 7.0).step(0.1),
                choice(
                    "stSlope",
                    "ST slope",
                    &[("1", "Upsloping"), ("2", "Flat"), ("3", "Downsloping")],
                ),
            ],
        ),
    ]
}

/// The patient form with the smoker dependency wired and reconciled.
pub fn risk_form() -> FormNavigator {
    FormNavigator::new(risk_form_panels()).with_dependency(FieldDependency::new(
        SMOKER_FIELD,
        CIGARETTES_FIELD,
        "1",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_has_every_service_field() {
        let form = risk_form();
        for name in [
            "age",
            "sex",
            "education",
            "currentSmoker",
            "cigsPerDay",
            "BPMeds",
            "prevalentStroke",
            "prevalentHyp",
            "diabetes",
            "BMI",
            "heartRate",
            "sysBP",
            "diaBP",
            "restingBpS",
            "maxHeartRate",
            "chestPainType",
            "cholesterol",
            "totChol",
            "fastingBloodSugar",
            "restingEcg",
            "exerciseAngina",
            "oldpeak",
            "stSlope",
        ] {
            assert!(form.field(name).is_some(), "missing field {name}");
        }
    }

    #[test]
    fn field_names_are_unique() {
        let form = risk_form();
        let mut names: Vec<_> = form.fields().iter().map(|f| f.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn cigarettes_start_disabled() {
        let form = risk_form();
        assert!(form.field(CIGARETTES_FIELD).unwrap().disabled);
    }

    #[test]
    fn panel_ids_are_unique() {
        let form = risk_form();
        let ids: Vec<_> = form.panels().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["personal", "lifestyle", "history", "vitals", "cardiac"]);
    }
}
