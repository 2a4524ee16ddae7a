//! Wire DTOs for the food-log API.
//!
//! # Design
//! Field names match the backend's snake_case JSON. Unknown fields are
//! ignored. Optional fields that callers read as numbers are filled with an
//! explicit default in the decoder (see the per-field docs) instead of being
//! left as `Option`.
//!
//! These types are defined independently from the mock-server crate;
//! integration tests catch schema drift between the two.

use serde::{Deserialize, Serialize};

use crate::encoding;
use crate::error::ApiError;

/// The `{code, message, data}` wrapper most endpoints respond with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub code: i64,
    pub message: String,
    pub data: T,
}

/// Error body some endpoints send with non-200 statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginData {
    pub user_id: u64,
    pub access_token: String,
    pub username: String,
    pub email: String,
}

/// Registration input. Every field travels as a query parameter; the two
/// lists are sent as JSON-encoded strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub gender: String,
    pub birthday: String,
    pub height: f64,
    pub weight: f64,
    pub start_weight: f64,
    pub start_date: String,
    pub target_weight: f64,
    pub target_date: String,
    pub medical_conditions: Vec<String>,
    pub medication: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoutReceipt {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub detail: UserDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDetail {
    #[serde(default)]
    pub gender: Option<String>,
    pub birthday: String,
    pub height: f64,
    pub weight: f64,
    pub start_weight: f64,
    pub start_date: String,
    pub target_weight: f64,
    pub target_date: String,
    pub medical_conditions: Vec<String>,
    /// A JSON-encoded list of strings. Read it through [`UserDetail::medications`].
    #[serde(default)]
    pub medication: Option<String>,
}

impl UserDetail {
    /// Decoded medication list; absent means none.
    pub fn medications(&self) -> Result<Vec<String>, ApiError> {
        encoding::decode_string_list(self.medication.as_deref())
    }

    /// Share of the start→target weight change achieved so far, in percent.
    /// Zero when start and target are the same.
    pub fn weight_progress(&self) -> f64 {
        let total_change = self.start_weight - self.target_weight;
        if total_change == 0.0 {
            return 0.0;
        }
        (self.start_weight - self.weight) / total_change * 100.0
    }
}

// ---------------------------------------------------------------------------
// Weight
// ---------------------------------------------------------------------------

/// A weight entry persisted by the backend. `date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeightRecord {
    pub id: u64,
    pub user_id: u64,
    pub date: String,
    pub weight: i64,
}

// ---------------------------------------------------------------------------
// Food records
// ---------------------------------------------------------------------------

/// Nutrition facts of one logged item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodDescription {
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    #[serde(rename = "type")]
    pub food_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodRecord {
    pub record_id: u64,
    pub date: String,
    pub description: FoodDescription,
    pub image_id: u64,
    pub file_path: String,
}

/// Summed nutrition of a set of food records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrates: f64,
}

pub fn daily_nutrition_totals(records: &[FoodRecord]) -> NutritionTotals {
    records
        .iter()
        .fold(NutritionTotals::default(), |mut acc, record| {
            let d = &record.description;
            acc.calories += d.calories;
            acc.protein += d.protein;
            acc.fat += d.fat;
            acc.carbohydrates += d.carbohydrates;
            acc
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddedFoodItem {
    pub id: u64,
    pub image_id: u64,
    pub date: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedRecord {
    pub message: String,
    pub deleted_id: u64,
}

// ---------------------------------------------------------------------------
// Images and recognition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedImage {
    pub id: u64,
    pub filename: String,
    pub file_path: String,
    pub upload_time: String,
}

/// Scan response. Older than the envelope: no `code`, and the image id sits
/// next to `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanOutcome {
    pub message: String,
    pub data: ScanResult,
    pub image_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanResult {
    pub food_name: String,
    #[serde(rename = "type")]
    pub food_type: String,
    /// 0–10, one unit per half star.
    pub rating: u8,
    pub nutritional_info_per_100g: NutritionalInfo,
    pub detail: Vec<FoodDetail>,
    #[serde(default)]
    pub dietary_advice: Option<String>,
    #[serde(default)]
    pub brand_info: Option<BrandInfo>,
}

impl ScanResult {
    /// Rating on a five-star scale.
    pub fn stars(&self) -> f32 {
        f32::from(self.rating.min(10)) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionalInfo {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrates: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodDetail {
    pub calories: f64,
    pub food_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrandInfo {
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub safety_check: Option<SafetyCheck>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetyCheck {
    pub recent_issues: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub dietary_restrictions: Vec<String>,
    pub health_tips: Vec<String>,
    pub nutritional_balance: NutritionalBalance,
    pub recommended_meals: Vec<RecommendedMeal>,
    pub total_calories: f64,
}

const MEAL_ORDER: [&str; 3] = ["Breakfast", "Lunch", "Dinner"];

impl Recommendation {
    /// Meals ordered breakfast, lunch, dinner; other meal types follow in
    /// the order the server sent them.
    pub fn meals_in_serving_order(&self) -> Vec<&RecommendedMeal> {
        let mut meals: Vec<&RecommendedMeal> = self.recommended_meals.iter().collect();
        meals.sort_by_key(|meal| {
            MEAL_ORDER
                .iter()
                .position(|name| name.eq_ignore_ascii_case(&meal.meal_type))
                .unwrap_or(MEAL_ORDER.len())
        });
        meals
    }
}

/// Macro split in percent. The three values are not required to add up to 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionalBalance {
    pub carbohydrates_percentage: f64,
    pub fat_percentage: f64,
    pub protein_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMeal {
    pub meal_type: String,
    pub foods: Vec<RecommendedFood>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedFood {
    pub food_name: String,
    pub portion_size: String,
    /// Absent → 0.
    #[serde(default)]
    pub rate: u8,
    /// Absent → 0.0.
    #[serde(default)]
    pub foodcalories: f64,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub parts: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            parts: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            parts: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoutRequest {
    pub user_id: u64,
}

/// Body of the add-food call. `description` is a [`FoodDescription`]
/// serialized to a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddFoodItemRequest {
    pub image_id: u64,
    pub description: String,
}

impl AddFoodItemRequest {
    pub fn new(image_id: u64, description: &FoodDescription) -> Result<Self, ApiError> {
        Ok(Self {
            image_id,
            description: encoding::encode_json_string(description)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecommendRequest {
    pub userid: u64,
    pub personalized: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub history: Vec<ChatTurn>,
}
