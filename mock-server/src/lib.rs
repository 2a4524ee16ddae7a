use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    fn ok(message: &str, data: T) -> Json<Self> {
        Json(Self {
            code: 200,
            message: message.to_string(),
            data,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub detail: UserDetail,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserDetail {
    pub gender: Option<String>,
    pub birthday: String,
    pub height: f64,
    pub weight: f64,
    pub start_weight: f64,
    pub start_date: String,
    pub target_weight: f64,
    pub target_date: String,
    pub medical_conditions: Vec<String>,
    pub medication: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginData {
    pub user_id: u64,
    pub access_token: String,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightRecord {
    pub id: u64,
    pub user_id: u64,
    pub date: String,
    pub weight: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodDescription {
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    #[serde(rename = "type")]
    pub food_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodRecord {
    pub record_id: u64,
    pub date: String,
    pub description: FoodDescription,
    pub image_id: u64,
    pub file_path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: u64,
    pub filename: String,
    pub file_path: String,
    pub upload_time: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub parts: String,
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RegisterParams {
    pub username: String,
    pub password: String,
    pub email: String,
    pub gender: Option<String>,
    pub birthday: String,
    pub height: f64,
    pub weight: f64,
    pub start_weight: f64,
    pub start_date: String,
    pub target_weight: f64,
    pub target_date: String,
    pub medical_conditions: String,
    pub medication: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginParams {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LogoutBody {
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct RecordsParams {
    pub user_id: u64,
    pub date: String,
}

#[derive(Deserialize)]
pub struct UploadParams {
    pub upload_id: u64,
}

#[derive(Deserialize)]
pub struct ScanParams {
    pub image_id: u64,
    pub static_path: String,
}

#[derive(Deserialize)]
pub struct AddFoodBody {
    pub image_id: u64,
    pub description: String,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub record_id: u64,
}

#[derive(Deserialize)]
pub struct RecommendBody {
    pub userid: u64,
    pub personalized: String,
}

#[derive(Deserialize)]
pub struct ChatBody {
    pub message: String,
    pub history: Vec<ChatTurn>,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct Account {
    profile: UserProfile,
    password: String,
    token: Option<String>,
}

#[derive(Default)]
pub struct Store {
    last_id: u64,
    accounts: HashMap<u64, Account>,
    weights: Vec<WeightRecord>,
    images: HashMap<u64, (u64, UploadedImage)>,
    records: Vec<(u64, FoodRecord)>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Add a weight entry for an existing user, e.g. to seed a trend.
    pub fn push_weight(&mut self, user_id: u64, date: &str, weight: i64) {
        let id = self.next_id();
        self.weights.push(WeightRecord {
            id,
            user_id,
            date: date.to_string(),
            weight,
        });
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error answered with an `{code, message}` body.
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: i64::from(self.status.as_u16()),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    app_with_store(Db::default())
}

pub fn app_with_store(db: Db) -> Router {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/logout", post(logout))
        .route("/api/users/user/{id}", get(get_user))
        .route("/api/status/weight/{id}", get(weight_trend))
        .route("/api/records/get", get(food_records))
        .route("/api/records/add", post(add_food_item))
        .route("/api/records/delete", delete(delete_record))
        .route("/api/images/upload", post(upload_image))
        .route("/api/images/scan", post(scan_image))
        .route("/api/chat/recommend", post(recommend))
        .route("/api/chat/chat/{id}", post(chat))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

async fn register(
    State(db): State<Db>,
    Query(params): Query<RegisterParams>,
) -> Result<Json<Envelope<UserProfile>>, Failure> {
    let medical_conditions: Vec<String> = serde_json::from_str(&params.medical_conditions)
        .map_err(|e| Failure::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let mut store = db.write().await;
    let taken = store.accounts.values().any(|a| {
        a.profile.username == params.username || a.profile.email == params.email
    });
    if taken {
        return Err(Failure::new(StatusCode::CONFLICT, "Username or email already exists"));
    }

    let id = store.next_id();
    let profile = UserProfile {
        id,
        username: params.username,
        email: params.email,
        is_active: true,
        created_at: now(),
        updated_at: None,
        detail: UserDetail {
            gender: params.gender,
            birthday: params.birthday,
            height: params.height,
            weight: params.weight,
            start_weight: params.start_weight,
            start_date: params.start_date.clone(),
            target_weight: params.target_weight,
            target_date: params.target_date,
            medical_conditions,
            medication: params.medication,
        },
    };
    store.push_weight(id, &params.start_date, params.start_weight.round() as i64);
    store.accounts.insert(
        id,
        Account {
            profile: profile.clone(),
            password: params.password,
            token: None,
        },
    );
    tracing::info!(user_id = id, "registered user");
    Ok(Envelope::ok("Registration successful", profile))
}

async fn login(
    State(db): State<Db>,
    Query(params): Query<LoginParams>,
) -> Result<Json<Envelope<LoginData>>, Failure> {
    let mut store = db.write().await;
    let account = store
        .accounts
        .values_mut()
        .find(|a| {
            a.profile.username == params.username_or_email
                || a.profile.email == params.username_or_email
        })
        .filter(|a| a.password == params.password)
        .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let token = Uuid::new_v4().to_string();
    account.token = Some(token.clone());
    Ok(Envelope::ok(
        "Login successful",
        LoginData {
            user_id: account.profile.id,
            access_token: token,
            username: account.profile.username.clone(),
            email: account.profile.email.clone(),
        },
    ))
}

async fn logout(
    State(db): State<Db>,
    Json(body): Json<LogoutBody>,
) -> Result<Json<ErrorBody>, Failure> {
    let mut store = db.write().await;
    let account = store
        .accounts
        .get_mut(&body.user_id)
        .ok_or_else(|| Failure::not_found("User"))?;
    account.token = None;
    Ok(Json(ErrorBody {
        code: 200,
        message: "Logout successful".to_string(),
    }))
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Envelope<UserProfile>>, Failure> {
    let store = db.read().await;
    let account = store.accounts.get(&id).ok_or_else(|| Failure::not_found("User"))?;
    Ok(Envelope::ok("ok", account.profile.clone()))
}

async fn weight_trend(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Envelope<Vec<WeightRecord>>>, Failure> {
    let store = db.read().await;
    if !store.accounts.contains_key(&id) {
        return Err(Failure::not_found("User"));
    }
    let weights = store
        .weights
        .iter()
        .filter(|w| w.user_id == id)
        .cloned()
        .collect();
    Ok(Envelope::ok("ok", weights))
}

// ---------------------------------------------------------------------------
// Food records
// ---------------------------------------------------------------------------

async fn food_records(
    State(db): State<Db>,
    Query(params): Query<RecordsParams>,
) -> Json<Envelope<Vec<FoodRecord>>> {
    let store = db.read().await;
    let records = store
        .records
        .iter()
        .filter(|(owner, r)| *owner == params.user_id && r.date == params.date)
        .map(|(_, r)| r.clone())
        .collect();
    Envelope::ok("ok", records)
}

async fn add_food_item(
    State(db): State<Db>,
    Json(body): Json<AddFoodBody>,
) -> Result<Json<Envelope<Value>>, Failure> {
    let description: FoodDescription = serde_json::from_str(&body.description)
        .map_err(|e| Failure::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let mut store = db.write().await;
    let (owner, image) = store
        .images
        .get(&body.image_id)
        .cloned()
        .ok_or_else(|| Failure::not_found("Image"))?;
    let id = store.next_id();
    let date = today();
    store.records.push((
        owner,
        FoodRecord {
            record_id: id,
            date: date.clone(),
            description,
            image_id: image.id,
            file_path: image.file_path,
        },
    ));
    Ok(Envelope::ok(
        "ok",
        json!({
            "id": id,
            "image_id": body.image_id,
            "date": date,
            "message": "Food item added",
        }),
    ))
}

async fn delete_record(
    State(db): State<Db>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Envelope<Value>>, Failure> {
    let mut store = db.write().await;
    let position = store
        .records
        .iter()
        .position(|(_, r)| r.record_id == params.record_id)
        .ok_or_else(|| Failure::not_found("Record"))?;
    store.records.remove(position);
    Ok(Envelope::ok(
        "ok",
        json!({ "message": "Record deleted", "deleted_id": params.record_id }),
    ))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

async fn upload_image(
    State(db): State<Db>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<UploadedImage>>, Failure> {
    let mut size = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Failure::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if field.content_type() != Some("image/jpeg") {
            return Err(Failure::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Only JPEG images are accepted",
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Failure::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        size = Some(bytes.len());
    }
    let size = size.ok_or_else(|| Failure::new(StatusCode::BAD_REQUEST, "Missing file field"))?;

    let mut store = db.write().await;
    if !store.accounts.contains_key(&params.upload_id) {
        return Err(Failure::not_found("User"));
    }
    let id = store.next_id();
    let filename = format!("{}.jpg", Uuid::new_v4());
    let image = UploadedImage {
        id,
        file_path: format!("static/uploads/{filename}"),
        filename,
        upload_time: now(),
    };
    store.images.insert(id, (params.upload_id, image.clone()));
    tracing::info!(image_id = id, bytes = size, "stored upload");
    Ok(Envelope::ok("Upload successful", image))
}

async fn scan_image(
    State(db): State<Db>,
    Query(params): Query<ScanParams>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let (_, image) = store
        .images
        .get(&params.image_id)
        .ok_or_else(|| Failure::not_found("Image"))?;
    if image.file_path != params.static_path {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "static_path does not match image"));
    }
    Ok(Json(json!({
        "message": "Scan successful",
        "image_id": params.image_id,
        "data": {
            "food_name": "Chicken salad",
            "type": "salad",
            "rating": 8,
            "nutritional_info_per_100g": {
                "calories": 145,
                "protein": 12.5,
                "fat": 8.0,
                "carbohydrates": 5.2
            },
            "detail": [
                {"calories": 110, "food_name": "Grilled chicken"},
                {"calories": 35, "food_name": "Mixed greens"}
            ],
            "dietary_advice": "A balanced, protein-rich choice."
        }
    })))
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

async fn recommend(
    State(db): State<Db>,
    Json(body): Json<RecommendBody>,
) -> Result<Json<Envelope<Value>>, Failure> {
    let store = db.read().await;
    if !store.accounts.contains_key(&body.userid) {
        return Err(Failure::not_found("User"));
    }
    let restrictions: Vec<&str> = match body.personalized.as_str() {
        "" | "nothing" => Vec::new(),
        other => vec![other],
    };
    Ok(Envelope::ok(
        "ok",
        json!({
            "dietary_restrictions": restrictions,
            "health_tips": ["Drink water before meals", "Prefer whole grains"],
            "nutritional_balance": {
                "carbohydrates_percentage": 45,
                "fat_percentage": 30,
                "protein_percentage": 25
            },
            "recommended_meals": [
                {"meal_type": "Dinner", "foods": [
                    {"food_name": "Baked salmon", "portion_size": "150 g", "rate": 9, "foodcalories": 310}
                ]},
                {"meal_type": "Breakfast", "foods": [
                    {"food_name": "Oatmeal", "portion_size": "1 bowl", "foodcalories": 150},
                    {"food_name": "Blueberries", "portion_size": "1 cup"}
                ]},
                {"meal_type": "Lunch", "foods": [
                    {"food_name": "Lentil soup", "portion_size": "1 bowl", "rate": 8, "foodcalories": 230}
                ]}
            ],
            "total_calories": 690
        }),
    ))
}

async fn chat(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<ChatBody>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    if !store.accounts.contains_key(&id) {
        return Err(Failure::not_found("User"));
    }
    let mut history = body.history;
    history.push(ChatTurn {
        role: "user".to_string(),
        parts: body.message.clone(),
    });
    history.push(ChatTurn {
        role: "model".to_string(),
        parts: format!("You said: {}", body.message),
    });
    Ok(Json(json!({ "history": history })))
}
