//! Stateless request builder and response parser for the food-log API.
//!
//! # Design
//! `FoodLogClient` holds only the API base URL. Each operation is split into
//! a `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Bodies are decoded only for status 200;
//! every other status becomes `ApiError::ServerError` before decoding is
//! attempted.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::encoding::{self, MultipartImage};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::{BodyKind, Endpoint, HttpRequest, HttpResponse};
use crate::types::{
    AddFoodItemRequest, AddedFoodItem, ChatReply, ChatRequest, ChatTurn, Credentials,
    DeletedRecord, Envelope, ErrorBody, FoodDescription, FoodRecord, LoginData, LogoutReceipt,
    LogoutRequest, Recommendation, RecommendRequest, Registration, ScanOutcome, UploadedImage,
    UserProfile, WeightRecord,
};

/// Fixed prefix between the origin and every endpoint path.
pub const API_PREFIX: &str = "/api";

/// Synchronous, stateless client for the food-log API.
#[derive(Debug, Clone)]
pub struct FoodLogClient {
    base_url: String,
}

impl FoodLogClient {
    /// `origin` is scheme + host (+ port), e.g. `http://127.0.0.1:8000`.
    pub fn new(origin: &str) -> Self {
        Self {
            base_url: format!("{}{API_PREFIX}", origin.trim_end_matches('/')),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let query = [
            ("username_or_email", credentials.username_or_email.clone()),
            ("password", credentials.password.clone()),
        ];
        self.bare(&endpoints::LOGIN, None, &query)
    }

    pub fn build_register(&self, registration: &Registration) -> Result<HttpRequest, ApiError> {
        let query = [
            ("username", registration.username.clone()),
            ("password", registration.password.clone()),
            ("email", registration.email.clone()),
            ("gender", registration.gender.clone()),
            ("birthday", registration.birthday.clone()),
            ("height", registration.height.to_string()),
            ("weight", registration.weight.to_string()),
            ("start_weight", registration.start_weight.to_string()),
            ("start_date", registration.start_date.clone()),
            ("target_weight", registration.target_weight.to_string()),
            ("target_date", registration.target_date.clone()),
            (
                "medical_conditions",
                encoding::encode_string_list(&registration.medical_conditions)?,
            ),
            ("medication", encoding::encode_string_list(&registration.medication)?),
        ];
        self.bare(&endpoints::REGISTER, None, &query)
    }

    pub fn build_logout(&self, user_id: u64) -> Result<HttpRequest, ApiError> {
        self.json(&endpoints::LOGOUT, None, &LogoutRequest { user_id })
    }

    pub fn build_get_user_profile(&self, user_id: u64) -> Result<HttpRequest, ApiError> {
        self.bare(&endpoints::USER_PROFILE, Some(user_id), &[])
    }

    pub fn build_get_weight_trend(&self, user_id: u64) -> Result<HttpRequest, ApiError> {
        self.bare(&endpoints::WEIGHT_TREND, Some(user_id), &[])
    }

    pub fn build_get_food_records(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<HttpRequest, ApiError> {
        let query = [
            ("user_id", user_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        self.bare(&endpoints::FOOD_RECORDS, None, &query)
    }

    /// `jpeg` is the already-encoded picture.
    pub fn build_upload_image(&self, user_id: u64, jpeg: &[u8]) -> Result<HttpRequest, ApiError> {
        let endpoint = &endpoints::UPLOAD_IMAGE;
        expect_body(endpoint, BodyKind::Multipart)?;
        let multipart = MultipartImage::jpeg(jpeg)?;
        Ok(HttpRequest {
            method: endpoint.method,
            url: self.url(endpoint, None, &[("upload_id", user_id.to_string())])?,
            headers: vec![("content-type".to_string(), multipart.content_type())],
            body: Some(multipart.body),
        })
    }

    pub fn build_scan_image(
        &self,
        image_id: u64,
        static_path: &str,
    ) -> Result<HttpRequest, ApiError> {
        let query = [
            ("static_path", static_path.to_string()),
            ("image_id", image_id.to_string()),
        ];
        self.bare(&endpoints::SCAN_IMAGE, None, &query)
    }

    pub fn build_add_food_item(
        &self,
        image_id: u64,
        description: &FoodDescription,
    ) -> Result<HttpRequest, ApiError> {
        let body = AddFoodItemRequest::new(image_id, description)?;
        self.json(&endpoints::ADD_FOOD_ITEM, None, &body)
    }

    pub fn build_delete_record(&self, record_id: u64) -> Result<HttpRequest, ApiError> {
        self.bare(
            &endpoints::DELETE_RECORD,
            None,
            &[("record_id", record_id.to_string())],
        )
    }

    /// `personalized` is the free-text dietary preference.
    pub fn build_get_recommended_food(
        &self,
        user_id: u64,
        personalized: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = RecommendRequest {
            userid: user_id,
            personalized: personalized.to_string(),
        };
        self.json(&endpoints::RECOMMENDED_FOOD, None, &body)
    }

    pub fn build_send_chat_message(
        &self,
        user_id: u64,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<HttpRequest, ApiError> {
        let body = ChatRequest {
            message: message.to_string(),
            history: history.to_vec(),
        };
        self.json(&endpoints::CHAT, Some(user_id), &body)
    }

    // -----------------------------------------------------------------------
    // Parsers
    // -----------------------------------------------------------------------

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginData, ApiError> {
        check_status(&response, "Login failed")?;
        decode_data(&response)
    }

    /// Non-200 answers may carry an `{code, message}` body; its message is
    /// surfaced when present.
    pub fn parse_register(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        check_well_formed(&response)?;
        if response.status != 200 {
            let message = match serde_json::from_slice::<ErrorBody>(&response.body) {
                Ok(body) => body.message,
                Err(_) => format!(
                    "Registration failed with status code {}",
                    response.status
                ),
            };
            return Err(ApiError::ServerError {
                status: response.status,
                message,
            });
        }
        decode_data(&response)
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<LogoutReceipt, ApiError> {
        check_status(&response, "Logout failed")?;
        decode(&response)
    }

    pub fn parse_get_user_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        check_status(&response, "Get profile failed")?;
        decode_data(&response)
    }

    pub fn parse_get_weight_trend(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<WeightRecord>, ApiError> {
        check_status(&response, "Get weight trend failed")?;
        decode_data(&response)
    }

    pub fn parse_get_food_records(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<FoodRecord>, ApiError> {
        check_status(&response, "Get food records failed")?;
        decode_data(&response)
    }

    pub fn parse_upload_image(&self, response: HttpResponse) -> Result<UploadedImage, ApiError> {
        check_status(&response, "Image upload failed")?;
        decode_data(&response)
    }

    pub fn parse_scan_image(&self, response: HttpResponse) -> Result<ScanOutcome, ApiError> {
        check_status(&response, "Scan failed")?;
        decode(&response)
    }

    pub fn parse_add_food_item(&self, response: HttpResponse) -> Result<AddedFoodItem, ApiError> {
        check_status(&response, "Add food item failed")?;
        decode_data(&response)
    }

    pub fn parse_delete_record(&self, response: HttpResponse) -> Result<DeletedRecord, ApiError> {
        check_status(&response, "Delete record failed")?;
        decode_data(&response)
    }

    pub fn parse_get_recommended_food(
        &self,
        response: HttpResponse,
    ) -> Result<Recommendation, ApiError> {
        check_status(&response, "Failed to get recommended food")?;
        decode_data(&response)
    }

    /// Returns the full updated history as sent back by the server.
    pub fn parse_send_chat_message(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<ChatTurn>, ApiError> {
        check_status(&response, "Send chat message failed")?;
        decode::<ChatReply>(&response).map(|reply| reply.history)
    }

    // -----------------------------------------------------------------------
    // Request assembly
    // -----------------------------------------------------------------------

    fn url(
        &self,
        endpoint: &Endpoint,
        path_param: Option<u64>,
        query: &[(&str, String)],
    ) -> Result<String, ApiError> {
        let path = match path_param {
            Some(id) => endpoint.path.replacen("{}", &id.to_string(), 1),
            None => endpoint.path.to_string(),
        };
        if path.contains("{}") {
            return Err(ApiError::InvalidRequest(format!(
                "missing path parameter for {}",
                endpoint.path
            )));
        }
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| ApiError::InvalidRequest(format!("{}{path}: {e}", self.base_url)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.to_string())
    }

    /// A request whose parameters all live in the URL.
    fn bare(
        &self,
        endpoint: &Endpoint,
        path_param: Option<u64>,
        query: &[(&str, String)],
    ) -> Result<HttpRequest, ApiError> {
        expect_body(endpoint, BodyKind::None)?;
        Ok(HttpRequest {
            method: endpoint.method,
            url: self.url(endpoint, path_param, query)?,
            headers: Vec::new(),
            body: None,
        })
    }

    fn json<B: Serialize>(
        &self,
        endpoint: &Endpoint,
        path_param: Option<u64>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        expect_body(endpoint, BodyKind::Json)?;
        let body = serde_json::to_vec(body).map_err(|e| ApiError::InvalidData(e.to_string()))?;
        Ok(HttpRequest {
            method: endpoint.method,
            url: self.url(endpoint, path_param, &[])?,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn expect_body(endpoint: &Endpoint, kind: BodyKind) -> Result<(), ApiError> {
    if endpoint.body == kind {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "{} {} carries {:?}, not {kind:?}",
            endpoint.method, endpoint.path, endpoint.body
        )))
    }
}

/// Reject status codes outside 100..=599 as `InvalidResponse`. They are
/// representable on the wire but no server speaks them, so they are never
/// reported as `ServerError`; this is the one exception to "any non-200 is a
/// `ServerError`".
fn check_well_formed(response: &HttpResponse) -> Result<(), ApiError> {
    if (100..=599).contains(&response.status) {
        Ok(())
    } else {
        Err(ApiError::InvalidResponse(format!(
            "status code {} out of range",
            response.status
        )))
    }
}

/// Anything but 200 is a `ServerError` carrying the endpoint's message.
fn check_status(response: &HttpResponse, failure: &str) -> Result<(), ApiError> {
    check_well_formed(response)?;
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::ServerError {
        status: response.status,
        message: failure.to_string(),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::DecodingFailure(e.to_string()))
}

fn decode_data<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    decode::<Envelope<T>>(response).map(|envelope| envelope.data)
}
