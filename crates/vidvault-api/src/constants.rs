//! API constants

/// API base path prefix for JSON endpoints
pub const API_BASE: &str = "/api";

/// Every finalized upload is remuxed into an MP4 container
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Size of the "recently added" rows of the library overview
pub const RECENTLY_ADDED_LIMIT: i64 = 20;

/// Query parameter accepted in place of the Authorization header on GET
/// requests (`<video src>` cannot send headers)
pub const ACCESS_TOKEN_QUERY_PARAM: &str = "access_token";
