//! Typed OCRS/1.0 recipe record.
//!
//! These types are only ever built from JSON that has already passed
//! structural validation, so deserialization mirrors the canonical schema
//! field for field. Optional sections are omitted when serialized back out.

use serde::{Deserialize, Serialize};

/// The literal version tag every OCRS/1.0 record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecVersion {
    /// `"OCRS/1.0"`
    #[serde(rename = "OCRS/1.0")]
    V1_0,
}

/// A structurally valid cheesemaking recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrsRecipe {
    /// Format version tag.
    pub spec: SpecVersion,
    /// Recipe metadata.
    pub recipe: RecipeMeta,
    /// Ingredients in listed order.
    pub ingredients: Vec<Ingredient>,
    /// Steps in execution order.
    pub steps: Vec<Step>,
    /// Aging requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aging: Option<Aging>,
    /// Description of the finished cheese.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_product: Option<FinalProduct>,
    /// Equipment needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Equipment>,
    /// Allergen and storage information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<Safety>,
}

impl OcrsRecipe {
    /// Returns the declared allergens, or an empty slice when none are declared.
    #[must_use]
    pub fn allergens(&self) -> &[Allergen] {
        self.safety
            .as_ref()
            .and_then(|safety| safety.allergens.as_deref())
            .unwrap_or_default()
    }
}

/// Recipe-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMeta {
    /// Recipe title.
    pub name: String,
    /// Cheese family.
    pub style: CheeseStyle,
    /// Milk the cheese is made from.
    pub milk_type: MilkType,
    /// Region or tradition of origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Skill level required.
    pub difficulty: Difficulty,
    /// Milk volume for one batch.
    pub batch_size: BatchSize,
    /// Expected cheese yield.
    #[serde(default, rename = "yield", skip_serializing_if = "Option::is_none")]
    pub yield_amount: Option<Yield>,
    /// Total time in minutes.
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_time: Option<i64>,
    /// Active preparation time in minutes.
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub prep_time: Option<i64>,
    /// Where the recipe came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

/// Cheese family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheeseStyle {
    /// Unripened, eaten within days.
    Fresh,
    /// Bloomy or washed-rind soft cheese.
    Soft,
    /// Semi-soft.
    SemiSoft,
    /// Semi-hard.
    SemiHard,
    /// Hard, long-aged.
    Hard,
    /// Blue-veined.
    Blue,
    /// Stored in brine.
    Brined,
}

/// Milk source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilkType {
    /// Cow's milk.
    Cow,
    /// Goat's milk.
    Goat,
    /// Sheep's milk.
    Sheep,
    /// Water buffalo milk.
    Buffalo,
    /// A blend of milks.
    Mixed,
}

/// Skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    /// First cheese.
    Beginner,
    /// Some experience.
    Intermediate,
    /// Experienced.
    Advanced,
    /// Expert.
    Expert,
}

/// Milk volume for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSize {
    /// Volume, in `unit`.
    pub milk_volume: f64,
    /// Volume unit.
    pub unit: BatchUnit,
}

/// Batch volume unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchUnit {
    /// Liters.
    Liters,
    /// US gallons.
    Gallons,
}

/// Expected cheese yield for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yield {
    /// Weight, in `unit`.
    pub amount: f64,
    /// Weight unit.
    pub unit: YieldUnit,
}

/// Yield weight unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YieldUnit {
    /// Kilograms.
    Kg,
    /// Pounds.
    Lbs,
    /// Grams.
    Grams,
    /// Ounces.
    Oz,
}

/// Where the recipe came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Kind of source.
    #[serde(rename = "type")]
    pub kind: SourceType,
    /// Title, URL, or other citation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Kind of recipe source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Printed book.
    Book,
    /// Web page.
    Website,
    /// The author's own recipe.
    Original,
    /// Handed down.
    Traditional,
    /// Taught in a class.
    Course,
    /// Anything else.
    Other,
}

/// A single ingredient line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name.
    pub name: String,
    /// Role in the make.
    #[serde(rename = "type")]
    pub kind: IngredientType,
    /// Quantity, in `unit`.
    pub amount: f64,
    /// Free-form unit, e.g. `tsp`.
    pub unit: String,
    /// Preparation note, e.g. "dissolved in 1/4 cup water".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
}

/// Role an ingredient plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngredientType {
    /// Milk or cream.
    Primary,
    /// Starter or ripening culture.
    Culture,
    /// Rennet or acid coagulant.
    Coagulant,
    /// Calcium chloride, lipase and similar.
    Additive,
    /// Salt, herbs, spices.
    Seasoning,
    /// Anything else.
    Other,
}

/// One step of the make, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Declared 1-based position.
    #[serde(deserialize_with = "integral::deserialize")]
    pub step_number: i64,
    /// Short step title.
    pub title: String,
    /// Kind of step.
    pub category: StepCategory,
    /// Full instruction text.
    pub instructions: String,
    /// Target temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    /// Target pH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    /// How long the step lasts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<StepDuration>,
    /// Done-ness check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<StepValidation>,
}

/// Kind of step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepCategory {
    /// Warming milk or curds.
    Heating,
    /// Setting the curd.
    Coagulation,
    /// Cutting the curd.
    Cutting,
    /// Draining whey.
    Draining,
    /// Salting or brining.
    Salting,
    /// Pressing.
    Pressing,
    /// Aging.
    Aging,
    /// Anything else.
    Other,
}

/// A target temperature reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    /// Target value, in `unit`.
    pub target: f64,
    /// Temperature scale.
    pub unit: TempUnit,
}

/// Temperature scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempUnit {
    /// Celsius.
    C,
    /// Fahrenheit.
    F,
}

impl TempUnit {
    /// Returns the single-letter unit symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::F => "F",
        }
    }
}

/// How long a step lasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDuration {
    /// Fixed, open-ended, or ranged.
    #[serde(rename = "type")]
    pub kind: DurationType,
    /// Length, in `unit`.
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<i64>,
    /// Time unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DurationUnit>,
    /// Condition that ends the step, e.g. "clean break".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Shape of a step duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationType {
    /// An exact length.
    Fixed,
    /// Until a condition is observed.
    UntilCondition,
    /// A range of lengths.
    Range,
}

/// Step duration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
}

/// What a step should look like when done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidation {
    /// Observable result, e.g. "curds hold their shape".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
}

/// Aging requirements for the finished cheese.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aging {
    /// Whether the cheese must be aged.
    pub required: bool,
    /// Aging period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<AgingDuration>,
    /// Cave temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<AgingTemperature>,
    /// Cave humidity, e.g. "85-90%".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
}

/// Aging period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingDuration {
    /// Shortest period.
    #[serde(deserialize_with = "integral::deserialize")]
    pub min: i64,
    /// Longest period.
    #[serde(
        default,
        deserialize_with = "integral::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<i64>,
    /// Period unit.
    pub unit: AgingDurationUnit,
}

/// Aging period unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgingDurationUnit {
    /// Days.
    Days,
    /// Weeks.
    Weeks,
    /// Months.
    Months,
}

/// Cave temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingTemperature {
    /// Temperature, in `unit`.
    pub value: f64,
    /// Temperature scale.
    pub unit: TempUnit,
}

/// Description of the finished cheese.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinalProduct {
    /// Texture, e.g. "stretchy".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    /// Flavor notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Moisture level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture: Option<Moisture>,
    /// Paste or rind color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Moisture level of the finished cheese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Moisture {
    /// High moisture.
    High,
    /// Medium moisture.
    Medium,
    /// Low moisture.
    Low,
}

/// Equipment needed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    /// Everyday kitchen equipment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<EquipmentItem>>,
    /// Cheesemaking-specific equipment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_equipment: Option<Vec<SpecialEquipment>>,
}

/// A piece of everyday equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentItem {
    /// Equipment name.
    pub name: String,
}

/// A piece of cheesemaking-specific equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialEquipment {
    /// Equipment name.
    pub name: String,
    /// What it is used for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Substitutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
}

/// Allergen and storage information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Safety {
    /// Declared allergens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<Allergen>>,
    /// How long the cheese keeps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf_life: Option<ShelfLife>,
    /// Storage advice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_instructions: Option<String>,
}

/// A declarable allergen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Allergen {
    /// Milk protein.
    Milk,
    /// Lactose.
    Lactose,
    /// Tree nuts.
    Nuts,
    /// Soy.
    Soy,
    /// Gluten.
    Gluten,
    /// Eggs.
    Eggs,
}

impl Allergen {
    /// Returns the wire tag, e.g. `"MILK"`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Milk => "MILK",
            Self::Lactose => "LACTOSE",
            Self::Nuts => "NUTS",
            Self::Soy => "SOY",
            Self::Gluten => "GLUTEN",
            Self::Eggs => "EGGS",
        }
    }
}

/// How long the cheese keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShelfLife {
    /// Shelf life when fresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fresh: Option<String>,
    /// Shelf life once aged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aged: Option<String>,
}

/// Integer fields that also accept whole-valued floats such as `45.0`.
///
/// JSON Schema's `"integer"` type admits any number with a zero fractional
/// part, so these fields accept the same values the validator does.
mod integral {
    use std::fmt;

    use serde::Deserialize;
    use serde::de::{self, Deserializer, Unexpected, Visitor};

    struct IntegralVisitor;

    impl Visitor<'_> for IntegralVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integral number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&v);
            if in_range && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        deserializer.deserialize_any(IntegralVisitor)
    }

    pub fn option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        #[derive(Deserialize)]
        struct Whole(#[serde(deserialize_with = "deserialize")] i64);

        Ok(Option::<Whole>::deserialize(deserializer)?.map(|Whole(v)| v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_minimal_recipe() {
        let value = json!({
            "spec": "OCRS/1.0",
            "recipe": {
                "name": "Test Mozzarella",
                "style": "FRESH",
                "milkType": "COW",
                "difficulty": "BEGINNER",
                "batchSize": { "milkVolume": 3.785, "unit": "liters" }
            },
            "ingredients": [
                { "name": "Whole Milk", "type": "PRIMARY", "amount": 3.785, "unit": "liters" }
            ],
            "steps": [
                { "stepNumber": 1, "title": "Heat", "category": "HEATING", "instructions": "Heat milk" }
            ]
        });

        let recipe: OcrsRecipe = serde_json::from_value(value).unwrap();
        assert_eq!(recipe.spec, SpecVersion::V1_0);
        assert_eq!(recipe.recipe.style, CheeseStyle::Fresh);
        assert_eq!(recipe.recipe.batch_size.unit, BatchUnit::Liters);
        assert_eq!(recipe.ingredients[0].kind, IngredientType::Primary);
        assert!(recipe.safety.is_none());
        assert!(recipe.allergens().is_empty());
    }

    #[test]
    fn test_serialization_omits_absent_sections() {
        let value = json!({
            "spec": "OCRS/1.0",
            "recipe": {
                "name": "Chevre",
                "style": "SOFT",
                "milkType": "GOAT",
                "difficulty": "BEGINNER",
                "batchSize": { "milkVolume": 1, "unit": "gallons" },
                "yield": { "amount": 1.5, "unit": "lbs" }
            },
            "ingredients": [],
            "steps": [],
            "safety": { "allergens": ["MILK", "LACTOSE"] }
        });

        let recipe: OcrsRecipe = serde_json::from_value(value).unwrap();
        let out = serde_json::to_value(&recipe).unwrap();

        assert_eq!(out["recipe"]["yield"]["unit"], "lbs");
        assert_eq!(out["recipe"]["milkType"], "GOAT");
        assert!(out.get("aging").is_none());
        assert!(out["recipe"].get("origin").is_none());
        assert_eq!(recipe.allergens(), &[Allergen::Milk, Allergen::Lactose]);
    }

    #[test]
    fn test_integer_fields_accept_whole_floats() {
        let step: Step = serde_json::from_value(json!({
            "stepNumber": 2.0,
            "title": "Rest",
            "category": "COAGULATION",
            "instructions": "Let set",
            "duration": { "type": "FIXED", "value": 45.0, "unit": "minutes" }
        }))
        .unwrap();
        assert_eq!(step.step_number, 2);
        assert_eq!(step.duration.unwrap().value, Some(45));

        let aging: AgingDuration =
            serde_json::from_value(json!({ "min": 3.0, "max": 6, "unit": "months" })).unwrap();
        assert_eq!((aging.min, aging.max), (3, Some(6)));

        let out = serde_json::to_value(&aging).unwrap();
        assert_eq!(out["min"], json!(3));
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        let err = serde_json::from_value::<AgingDuration>(
            json!({ "min": 2.5, "unit": "weeks" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("integral"), "{err}");
    }
}
