use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ocrs_parser::extraction::build_error_feedback;
use ocrs_parser::prelude::*;
use serde_json::{Value, json};

const STRUCTURED_TEXT: &str = "Simple Mozzarella\n\nIngredients:\n- 4 liters whole milk\n- 1.5 tsp citric acid\n\nInstructions:\n1. Heat milk to 32C\n2. Add rennet and wait 45 minutes";

/// Replays a fixed list of responses, repeating the last one once exhausted.
struct Scripted {
    responses: Vec<Value>,
    calls: AtomicUsize,
    feedback_calls: AtomicUsize,
    feedback: Mutex<Vec<Vec<String>>>,
    formats: Mutex<Vec<InputFormat>>,
    supports_feedback: bool,
}

impl Scripted {
    fn new(responses: Vec<Value>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
            feedback_calls: AtomicUsize::new(0),
            feedback: Mutex::new(Vec::new()),
            formats: Mutex::new(Vec::new()),
            supports_feedback: true,
        }
    }

    fn without_feedback(mut self) -> Self {
        self.supports_feedback = false;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply(&self, format: InputFormat) -> ExtractedRecord {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.formats.lock().unwrap().push(format);
        let value = self
            .responses
            .get(index)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or(Value::Null);
        ExtractedRecord {
            value,
            provider: "scripted".into(),
            model: "script-1".into(),
            usage: TokenUsage::new(100, 50),
        }
    }
}

#[async_trait]
impl Extractor for Scripted {
    async fn parse(
        &self,
        _text: &str,
        format: InputFormat,
    ) -> Result<ExtractedRecord, ProviderError> {
        Ok(self.reply(format))
    }

    fn as_feedback(&self) -> Option<&dyn FeedbackExtractor> {
        if self.supports_feedback { Some(self) } else { None }
    }
}

#[async_trait]
impl FeedbackExtractor for Scripted {
    async fn parse_with_feedback(
        &self,
        _text: &str,
        format: InputFormat,
        errors: &[String],
    ) -> Result<ExtractedRecord, ProviderError> {
        self.feedback_calls.fetch_add(1, Ordering::SeqCst);
        self.feedback.lock().unwrap().push(errors.to_vec());
        Ok(self.reply(format))
    }
}

fn step(number: i64, title: &str, temperature: Option<f64>) -> Value {
    json!({
        "stepNumber": number,
        "title": title,
        "category": "HEATING",
        "instructions": format!("{title} carefully"),
        "temperature": temperature.map(|t| json!({ "target": t, "unit": "C" })),
        "ph": null,
        "duration": { "type": "FIXED", "value": 45, "unit": "minutes", "condition": null },
        "validation": null
    })
}

/// A record shaped the way a strict structured-output backend returns it.
fn mozzarella() -> Value {
    json!({
        "spec": "OCRS/1.0",
        "recipe": {
            "name": "Simple Mozzarella",
            "style": "FRESH",
            "milkType": "COW",
            "origin": "Italy",
            "difficulty": "BEGINNER",
            "batchSize": { "milkVolume": 4, "unit": "liters" },
            "yield": null,
            "totalTime": 60,
            "prepTime": null,
            "source": null
        },
        "ingredients": [
            { "name": "Whole milk", "type": "PRIMARY", "amount": 4, "unit": "liters", "preparation": null },
            { "name": "Citric acid", "type": "ADDITIVE", "amount": 1.5, "unit": "tsp", "preparation": "dissolved in water" }
        ],
        "steps": [step(1, "Heat milk", Some(32.0)), step(2, "Add rennet", None)],
        "aging": null,
        "finalProduct": null,
        "equipment": null,
        "safety": {
            "allergens": ["MILK", "LACTOSE"],
            "shelfLife": null,
            "storageInstructions": null
        }
    })
}

#[tokio::test]
async fn test_valid_record_succeeds_on_first_attempt() {
    let pipeline = Pipeline::new(Scripted::new(vec![mozzarella()])).unwrap();
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    let PipelineResult::Success { recipe, warnings, metrics } = result else {
        panic!("expected success");
    };
    assert_eq!(recipe.recipe.name, "Simple Mozzarella");
    assert_eq!(recipe.steps.len(), 2);
    assert!(recipe.recipe.yield_amount.is_none());
    assert!(warnings.is_empty());
    assert_eq!(metrics.attempts, 1);
    assert_eq!(metrics.usage, TokenUsage::new(100, 50));

    let provider = pipeline.provider();
    assert_eq!(provider.calls(), 1);
    assert_eq!(provider.feedback_calls.load(Ordering::SeqCst), 0);
    assert_eq!(*provider.formats.lock().unwrap(), vec![InputFormat::Structured]);
}

#[tokio::test]
async fn test_step_gap_is_corrected_through_feedback() {
    let mut gapped = mozzarella();
    gapped["steps"][1]["stepNumber"] = json!(3);

    let pipeline = Pipeline::new(Scripted::new(vec![gapped, mozzarella()])).unwrap();
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.metrics().attempts, 2);
    assert_eq!(result.metrics().usage, TokenUsage::new(200, 100));

    let provider = pipeline.provider();
    assert_eq!(provider.calls(), 2);
    assert_eq!(provider.feedback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *provider.feedback.lock().unwrap(),
        vec![vec!["Step 2 has stepNumber 3, expected 2".to_string()]]
    );
}

#[tokio::test]
async fn test_persistent_implausible_temperature_exhausts_retries() {
    let mut hot = mozzarella();
    hot["steps"][0]["temperature"]["target"] = json!(170);

    let pipeline = Pipeline::new(Scripted::new(vec![hot])).unwrap();
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    let PipelineResult::Failure { errors, warnings, metrics } = result else {
        panic!("expected failure");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("implausible"));
    assert!(warnings.is_empty());
    assert_eq!(metrics.attempts, 3);

    let provider = pipeline.provider();
    assert_eq!(provider.calls(), 3);
    let feedback = provider.feedback.lock().unwrap();
    assert_eq!(feedback.len(), 2);
    assert!(feedback.iter().all(|errors| errors[0].contains("170°C is implausible")));
}

#[tokio::test]
async fn test_failure_reports_only_last_attempt_errors() {
    let mut structural = mozzarella();
    structural["recipe"]["style"] = json!("RUBBERY");
    let mut no_allergens = mozzarella();
    no_allergens["safety"] = Value::Null;

    let pipeline = Pipeline::new(Scripted::new(vec![structural, no_allergens]))
        .unwrap()
        .with_config(ExtractionConfig::default().with_max_retries(1));
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    assert_eq!(
        result.errors(),
        ["Missing required allergens for dairy recipe: MILK, LACTOSE"]
    );

    let feedback = pipeline.provider().feedback.lock().unwrap();
    assert_eq!(feedback.len(), 1);
    assert!(feedback[0][0].starts_with("Schema error at recipe.style: "));
}

#[tokio::test]
async fn test_missing_allergens_name_both_tags() {
    let mut record = mozzarella();
    record["safety"]["allergens"] = json!(["NUTS"]);

    let pipeline = Pipeline::new(Scripted::new(vec![record]))
        .unwrap()
        .with_config(ExtractionConfig::default().with_max_retries(0));
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    assert_eq!(
        result.errors(),
        ["Missing required allergens for dairy recipe: MILK, LACTOSE"]
    );
}

#[tokio::test]
async fn test_empty_input_never_calls_provider() {
    let pipeline = Pipeline::new(Scripted::new(vec![mozzarella()])).unwrap();

    assert_eq!(pipeline.run("").await, Err(InputError::Empty));
    assert!(matches!(
        pipeline.run(&"x".repeat(50_001)).await,
        Err(InputError::TooLarge { length: 50_001, .. })
    ));
    assert_eq!(pipeline.provider().calls(), 0);
}

#[tokio::test]
async fn test_provider_without_feedback_is_called_plainly() {
    let mut broken = mozzarella();
    broken.as_object_mut().unwrap().remove("spec");

    let pipeline =
        Pipeline::new(Scripted::new(vec![broken, mozzarella()]).without_feedback()).unwrap();
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    assert!(result.is_success());
    let provider = pipeline.provider();
    assert_eq!(provider.calls(), 2);
    assert_eq!(provider.feedback_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_warnings_reach_successful_result() {
    fn long_name(recipe: &OcrsRecipe) -> Vec<SemanticFinding> {
        if recipe.recipe.name.len() > 10 {
            vec![SemanticFinding::warn("name-length", "Recipe name is long")]
        } else {
            vec![SemanticFinding::pass("name-length", "Recipe name is short")]
        }
    }
    let rules = SemanticRuleEngine::default().with_rule(Rule {
        id: "name-length",
        check: long_name,
    });

    let pipeline = Pipeline::new(Scripted::new(vec![mozzarella()]))
        .unwrap()
        .with_rules(rules);
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.warnings(), ["Recipe name is long"]);
}

#[tokio::test]
async fn test_warnings_of_failed_attempts_are_discarded() {
    fn always_warn(_: &OcrsRecipe) -> Vec<SemanticFinding> {
        vec![SemanticFinding::warn("always-warn", "Check the yield")]
    }
    let rules = SemanticRuleEngine::default().with_rule(Rule {
        id: "always-warn",
        check: always_warn,
    });
    let mut record = mozzarella();
    record["steps"][0]["ph"] = json!(9.2);

    let pipeline = Pipeline::new(Scripted::new(vec![record]))
        .unwrap()
        .with_rules(rules);
    let result = pipeline.run(STRUCTURED_TEXT).await.unwrap();

    assert!(!result.is_success());
    assert!(result.warnings().is_empty());
    assert!(result.errors()[0].contains("pH 9.2 is outside cheesemaking range"));
}

#[tokio::test]
async fn test_format_hint_follows_input_shape() {
    let pipeline = Pipeline::new(Scripted::new(vec![mozzarella()])).unwrap();
    pipeline
        .run("I warmed a pot of milk with a splash of vinegar until it split and then strained it")
        .await
        .unwrap();

    assert_eq!(
        *pipeline.provider().formats.lock().unwrap(),
        vec![InputFormat::Unstructured]
    );
}

#[test]
fn test_feedback_text_is_stable() {
    let errors = vec!["a".to_string(), "b".to_string()];
    assert_eq!(
        build_error_feedback(&errors),
        "Your previous output had these errors:\n- a\n- b\nPlease fix these specific issues and re-output."
    );
}
