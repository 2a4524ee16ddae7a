//! One call per API operation: build, send, parse.
//!
//! `ApiService` pairs the stateless `FoodLogClient` with a `Transport`.
//! Nothing is shared between calls, so a service can be used from several
//! threads at once; calls are independent and unordered relative to each
//! other.

use chrono::NaiveDate;
use tracing::{debug, info_span, warn};

use crate::client::FoodLogClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AddedFoodItem, ChatTurn, Credentials, DeletedRecord, FoodDescription, FoodRecord, LoginData,
    LogoutReceipt, Recommendation, Registration, ScanOutcome, UploadedImage, UserProfile,
    WeightRecord,
};

#[derive(Debug, Clone)]
pub struct ApiService<T> {
    client: FoodLogClient,
    transport: T,
}

impl ApiService<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(FoodLogClient::new(&config.origin), UreqTransport::new())
    }
}

impl<T: Transport> ApiService<T> {
    pub fn new(client: FoodLogClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &FoodLogClient {
        &self.client
    }

    fn call<R>(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&FoodLogClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let span = info_span!("api_call", operation);
        let _guard = span.enter();

        let result = request
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| {
                debug!(status = response.status, "decoding response");
                parse(&self.client, response)
            });
        if let Err(err) = &result {
            warn!(error = %err, "api call failed");
        }
        result
    }

    pub fn login(&self, credentials: &Credentials) -> Result<LoginData, ApiError> {
        self.call(
            "login",
            self.client.build_login(credentials),
            FoodLogClient::parse_login,
        )
    }

    pub fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        self.call(
            "register",
            self.client.build_register(registration),
            FoodLogClient::parse_register,
        )
    }

    pub fn logout(&self, user_id: u64) -> Result<LogoutReceipt, ApiError> {
        self.call(
            "logout",
            self.client.build_logout(user_id),
            FoodLogClient::parse_logout,
        )
    }

    pub fn get_user_profile(&self, user_id: u64) -> Result<UserProfile, ApiError> {
        self.call(
            "get_user_profile",
            self.client.build_get_user_profile(user_id),
            FoodLogClient::parse_get_user_profile,
        )
    }

    pub fn get_weight_trend(&self, user_id: u64) -> Result<Vec<WeightRecord>, ApiError> {
        self.call(
            "get_weight_trend",
            self.client.build_get_weight_trend(user_id),
            FoodLogClient::parse_get_weight_trend,
        )
    }

    pub fn get_food_records(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<FoodRecord>, ApiError> {
        self.call(
            "get_food_records",
            self.client.build_get_food_records(user_id, date),
            FoodLogClient::parse_get_food_records,
        )
    }

    pub fn upload_image(&self, user_id: u64, jpeg: &[u8]) -> Result<UploadedImage, ApiError> {
        self.call(
            "upload_image",
            self.client.build_upload_image(user_id, jpeg),
            FoodLogClient::parse_upload_image,
        )
    }

    pub fn scan_image(&self, image_id: u64, static_path: &str) -> Result<ScanOutcome, ApiError> {
        self.call(
            "scan_image",
            self.client.build_scan_image(image_id, static_path),
            FoodLogClient::parse_scan_image,
        )
    }

    pub fn add_food_item(
        &self,
        image_id: u64,
        description: &FoodDescription,
    ) -> Result<AddedFoodItem, ApiError> {
        self.call(
            "add_food_item",
            self.client.build_add_food_item(image_id, description),
            FoodLogClient::parse_add_food_item,
        )
    }

    pub fn delete_record(&self, record_id: u64) -> Result<DeletedRecord, ApiError> {
        self.call(
            "delete_record",
            self.client.build_delete_record(record_id),
            FoodLogClient::parse_delete_record,
        )
    }

    pub fn get_recommended_food(
        &self,
        user_id: u64,
        personalized: &str,
    ) -> Result<Recommendation, ApiError> {
        self.call(
            "get_recommended_food",
            self.client.build_get_recommended_food(user_id, personalized),
            FoodLogClient::parse_get_recommended_food,
        )
    }

    pub fn send_chat_message(
        &self,
        user_id: u64,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<Vec<ChatTurn>, ApiError> {
        self.call(
            "send_chat_message",
            self.client.build_send_chat_message(user_id, message, history),
            FoodLogClient::parse_send_chat_message,
        )
    }
}
