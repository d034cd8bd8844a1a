//! Protobuf messages for the two gRPC methods this gateway calls.
//!
//! Only the fields the gateway reads or writes are declared; prost skips
//! unknown fields when decoding. Tags follow
//! `google/spanner/admin/database/v1/spanner_database_admin.proto` and
//! `google/cloud/translate/v3/translation_service.proto`.

/// `google.spanner.admin.database.v1.ListDatabasesRequest`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ListDatabasesRequest {
    /// Instance whose databases are listed.
    #[prost(string, tag = "1")]
    pub parent: String,
    /// Maximum databases per page; zero lets the server decide.
    #[prost(int32, tag = "3")]
    pub page_size: i32,
    /// `next_page_token` of the previous response.
    #[prost(string, tag = "4")]
    pub page_token: String,
}

/// `google.spanner.admin.database.v1.ListDatabasesResponse`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ListDatabasesResponse {
    /// Databases on this page.
    #[prost(message, repeated, tag = "1")]
    pub databases: Vec<Database>,
    /// Empty on the last page.
    #[prost(string, tag = "2")]
    pub next_page_token: String,
}

/// `google.spanner.admin.database.v1.Database`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Database {
    /// `projects/<p>/instances/<i>/databases/<d>`.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Lifecycle state (`1` creating, `2` ready, `3` ready-optimizing).
    #[prost(int32, tag = "2")]
    pub state: i32,
}

/// `google.cloud.translation.v3.TranslateTextRequest`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TranslateTextRequest {
    /// Texts to translate.
    #[prost(string, repeated, tag = "1")]
    pub contents: Vec<String>,
    /// `text/plain` or `text/html`; empty defaults to html.
    #[prost(string, tag = "3")]
    pub mime_type: String,
    /// Source language; empty requests auto-detection.
    #[prost(string, tag = "4")]
    pub source_language_code: String,
    /// Output language.
    #[prost(string, tag = "5")]
    pub target_language_code: String,
    /// `projects/<p>/locations/<l>`.
    #[prost(string, tag = "8")]
    pub parent: String,
}

/// `google.cloud.translation.v3.TranslateTextResponse`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TranslateTextResponse {
    /// One entry per input text, in request order.
    #[prost(message, repeated, tag = "1")]
    pub translations: Vec<Translation>,
}

/// `google.cloud.translation.v3.Translation`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Translation {
    /// Translated text.
    #[prost(string, tag = "1")]
    pub translated_text: String,
    /// Detected source language; empty when the request named one.
    #[prost(string, tag = "4")]
    pub detected_language_code: String,
}
