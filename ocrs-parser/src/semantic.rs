//! Domain plausibility rules evaluated on structurally valid recipes.
//!
//! Rules are plain functions registered by id. Each rule reports every
//! violation it finds, or exactly one pass finding when it finds none.

use std::fmt;

use serde::Serialize;

use crate::recipe::{Allergen, OcrsRecipe, Step, TempUnit};

/// Highest plausible cheesemaking temperature in Celsius. Higher readings are
/// usually Fahrenheit values that were never converted.
pub const MAX_PLAUSIBLE_TEMP_C: f64 = 85.0;

/// Lowest acceptable pH reading.
pub const PH_MIN: f64 = 4.0;

/// Highest acceptable pH reading.
pub const PH_MAX: f64 = 7.0;

/// Allergens every dairy recipe must declare, in reporting order.
pub const REQUIRED_ALLERGENS: [Allergen; 2] = [Allergen::Milk, Allergen::Lactose];

/// Verdict of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The rule found no violation.
    Pass,
    /// Worth surfacing, but the record is still accepted.
    Warn,
    /// The record is rejected.
    Fail,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        })
    }
}

/// One verdict produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticFinding {
    /// Id of the rule that produced this finding.
    pub rule: &'static str,
    /// The verdict.
    pub severity: Severity,
    /// Human-readable explanation.
    pub message: String,
}

impl SemanticFinding {
    /// A pass finding.
    #[must_use]
    pub fn pass(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Pass,
            message: message.into(),
        }
    }

    /// A warn finding.
    #[must_use]
    pub fn warn(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Warn,
            message: message.into(),
        }
    }

    /// A fail finding.
    #[must_use]
    pub fn fail(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: Severity::Fail,
            message: message.into(),
        }
    }
}

/// A registered domain rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Unique rule id, e.g. `"step-sequencing"`.
    pub id: &'static str,
    /// Pure check returning at least one finding.
    pub check: fn(&OcrsRecipe) -> Vec<SemanticFinding>,
}

/// Declared step numbers match 1-based positions.
pub const STEP_SEQUENCING: Rule = Rule {
    id: "step-sequencing",
    check: step_sequencing,
};

/// Celsius readings stay at or below [`MAX_PLAUSIBLE_TEMP_C`].
pub const TEMPERATURE_PLAUSIBILITY: Rule = Rule {
    id: "temperature-plausibility",
    check: temperature_plausibility,
};

/// pH readings fall within [`PH_MIN`]..=[`PH_MAX`].
pub const PH_RANGE: Rule = Rule {
    id: "ph-range",
    check: ph_range,
};

/// Declared duration values are positive.
pub const DURATION_SANITY: Rule = Rule {
    id: "duration-sanity",
    check: duration_sanity,
};

/// Both dairy allergens are declared.
pub const REQUIRED_ALLERGEN_TAGS: Rule = Rule {
    id: "required-allergens",
    check: required_allergens,
};

/// Every temperature reading is in Celsius.
pub const UNIT_CONSISTENCY: Rule = Rule {
    id: "unit-consistency",
    check: unit_consistency,
};

/// The built-in rules, in evaluation order.
pub const DEFAULT_RULES: [Rule; 6] = [
    STEP_SEQUENCING,
    TEMPERATURE_PLAUSIBILITY,
    PH_RANGE,
    DURATION_SANITY,
    REQUIRED_ALLERGEN_TAGS,
    UNIT_CONSISTENCY,
];

/// An ordered registry of rules.
#[derive(Debug, Clone)]
pub struct SemanticRuleEngine {
    rules: Vec<Rule>,
}

impl Default for SemanticRuleEngine {
    fn default() -> Self {
        Self::with_rules(DEFAULT_RULES.to_vec())
    }
}

impl SemanticRuleEngine {
    /// An engine running exactly `rules`, in order.
    #[must_use]
    pub const fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Appends a rule after the registered ones.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Registered rule ids, in evaluation order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.id)
    }

    /// Runs every rule and concatenates their findings in registration order.
    #[must_use]
    pub fn evaluate(&self, recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
        self.rules.iter().flat_map(|rule| (rule.check)(recipe)).collect()
    }
}

fn or_pass(rule: &'static str, failures: Vec<String>, pass: &str) -> Vec<SemanticFinding> {
    if failures.is_empty() {
        vec![SemanticFinding::pass(rule, pass)]
    } else {
        failures
            .into_iter()
            .map(|message| SemanticFinding::fail(rule, message))
            .collect()
    }
}

fn step_label(step: &Step) -> String {
    format!("Step {} \"{}\"", step.step_number, step.title)
}

fn step_sequencing(recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
    let failures = recipe
        .steps
        .iter()
        .zip(1_i64..)
        .filter(|(step, expected)| step.step_number != *expected)
        .map(|(step, expected)| {
            format!(
                "Step {expected} has stepNumber {}, expected {expected}",
                step.step_number
            )
        })
        .collect();
    or_pass(STEP_SEQUENCING.id, failures, "Step numbers are sequential")
}

fn temperature_plausibility(recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
    let failures = recipe
        .steps
        .iter()
        .filter_map(|step| {
            let temp = step.temperature.as_ref()?;
            (temp.unit == TempUnit::C && temp.target > MAX_PLAUSIBLE_TEMP_C).then(|| {
                format!(
                    "{}: temperature {}°C is implausible (likely unconverted Fahrenheit)",
                    step_label(step),
                    temp.target
                )
            })
        })
        .collect();
    or_pass(TEMPERATURE_PLAUSIBILITY.id, failures, "All temperatures plausible")
}

fn ph_range(recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
    let failures = recipe
        .steps
        .iter()
        .filter_map(|step| {
            let ph = step.ph?;
            (!(PH_MIN..=PH_MAX).contains(&ph)).then(|| {
                format!(
                    "{}: pH {ph} is outside cheesemaking range ({PH_MIN:.1}-{PH_MAX:.1})",
                    step_label(step)
                )
            })
        })
        .collect();
    or_pass(PH_RANGE.id, failures, "All pH values in range")
}

fn duration_sanity(recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
    let failures = recipe
        .steps
        .iter()
        .filter_map(|step| {
            let value = step.duration.as_ref()?.value?;
            (value <= 0).then(|| {
                format!(
                    "{}: duration {value} is invalid (must be positive)",
                    step_label(step)
                )
            })
        })
        .collect();
    or_pass(DURATION_SANITY.id, failures, "All durations valid")
}

fn required_allergens(recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
    let declared = recipe.allergens();
    let missing: Vec<&str> = REQUIRED_ALLERGENS
        .iter()
        .filter(|allergen| !declared.contains(allergen))
        .map(|allergen| allergen.tag())
        .collect();

    if missing.is_empty() {
        return vec![SemanticFinding::pass(
            REQUIRED_ALLERGEN_TAGS.id,
            "Required allergens present",
        )];
    }
    vec![SemanticFinding::fail(
        REQUIRED_ALLERGEN_TAGS.id,
        format!(
            "Missing required allergens for dairy recipe: {}",
            missing.join(", ")
        ),
    )]
}

fn unit_consistency(recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
    let failures = recipe
        .steps
        .iter()
        .filter_map(|step| {
            let temp = step.temperature.as_ref()?;
            (temp.unit != TempUnit::C).then(|| {
                format!(
                    "{}: temperature must be in Celsius, got {}",
                    step_label(step),
                    temp.unit.symbol()
                )
            })
        })
        .collect();
    or_pass(UNIT_CONSISTENCY.id, failures, "All units consistent")
}
