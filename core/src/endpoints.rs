//! Endpoint descriptors, one per API operation. Paths are relative to the
//! API base (`<origin>/api`).

use crate::http::{BodyKind, Endpoint, HttpMethod};

pub const LOGIN: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/users/login",
    body: BodyKind::None,
};

pub const REGISTER: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/users/register",
    body: BodyKind::None,
};

pub const LOGOUT: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/users/logout",
    body: BodyKind::Json,
};

pub const USER_PROFILE: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/users/user/{}",
    body: BodyKind::None,
};

pub const WEIGHT_TREND: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/status/weight/{}",
    body: BodyKind::None,
};

pub const FOOD_RECORDS: Endpoint = Endpoint {
    method: HttpMethod::Get,
    path: "/records/get",
    body: BodyKind::None,
};

pub const UPLOAD_IMAGE: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/images/upload",
    body: BodyKind::Multipart,
};

pub const SCAN_IMAGE: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/images/scan",
    body: BodyKind::None,
};

pub const ADD_FOOD_ITEM: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/records/add",
    body: BodyKind::Json,
};

pub const DELETE_RECORD: Endpoint = Endpoint {
    method: HttpMethod::Delete,
    path: "/records/delete",
    body: BodyKind::None,
};

pub const RECOMMENDED_FOOD: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/chat/recommend",
    body: BodyKind::Json,
};

pub const CHAT: Endpoint = Endpoint {
    method: HttpMethod::Post,
    path: "/chat/chat/{}",
    body: BodyKind::Json,
};
