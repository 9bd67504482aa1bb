pub mod query;

pub use query::EntryQuery;

use crate::config::get_api_url;
use crate::models::{
    Ack, Entry, EntryCreate, EntryListItem, EntryMedia, EntryProp, EntryUpdate, ErrorBody,
    ExportFormat, Hobby, HobbyCreate, HobbyType, HobbyTypeCreate, HobbyTypeUpdate, HobbyUpdate,
    LoginRequest, MediaKind, Page, PropValue, PropsReplace, User, UserUpdate,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

/// Code reported when the backend gives no machine-readable one.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (offline, DNS, CORS, aborted).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Http {
        status: u16,
        code: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// A success body that does not match the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// A local file could not be read for upload.
    #[error("could not read file: {0}")]
    File(String),
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn status_line(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

/// Turn a non-success response into an [`ApiError::Http`].
///
/// `code` falls back to [`UNKNOWN_ERROR_CODE`]; `message` falls back to a string `detail`,
/// then to the status line.
pub(crate) fn decode_error(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let detail_text = parsed
        .detail
        .as_ref()
        .and_then(|d| d.as_str())
        .map(str::to_string);

    let message = parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .or(detail_text)
        .unwrap_or_else(|| status_line(status));

    let details = parsed.details.or_else(|| {
        parsed
            .detail
            .filter(|d| !d.is_string() && !d.is_null())
    });

    ApiError::Http {
        status,
        code: parsed
            .code
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
        message,
        details,
    }
}

/// Decode a success body. 204 (or an empty body) decodes as an empty JSON object.
pub(crate) fn decode_success<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    if status == 204 || body.trim().is_empty() {
        return serde_json::from_value(serde_json::Value::Object(Default::default()))
            .map_err(ApiError::parse);
    }
    serde_json::from_str(body).map_err(ApiError::parse)
}

fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// File bytes ready for a multipart upload.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn from_web_file(file: &web_sys::File) -> ApiResult<Self> {
        let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
            .await
            .map_err(|e| ApiError::File(format!("{e:?}")))?;
        Ok(Self {
            name: file.name(),
            mime: file.type_(),
            bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
        })
    }

    fn into_part(self) -> ApiResult<Part> {
        let part = Part::bytes(self.bytes).file_name(self.name);
        if self.mime.is_empty() {
            Ok(part)
        } else {
            part.mime_str(&self.mime).map_err(ApiError::parse)
        }
    }
}

/// Typed client for the journal REST API.
///
/// In the browser the session cookie rides along through `credentials: include`;
/// native builds keep it in the client's own cookie store.
#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) base_url: String,
    #[cfg(not(target_arch = "wasm32"))]
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: crate::config::normalize_base_url(&base_url.into()),
            #[cfg(not(target_arch = "wasm32"))]
            http: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(get_api_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[cfg(target_arch = "wasm32")]
    fn http(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http().request(method, self.url(path));
        #[cfg(target_arch = "wasm32")]
        let req = req.fetch_credentials_include();
        req
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(ApiError::network)?;

        if (200..300).contains(&status) {
            decode_success(status, &body)
        } else {
            Err(decode_error(status, &body))
        }
    }

    async fn send_empty<T: DeserializeOwned>(&self, method: Method, path: &str) -> ApiResult<T> {
        let req = self
            .builder(method, path)
            .header(CONTENT_TYPE, "application/json");
        self.execute(req).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let req = self.builder(method, path).json(body);
        self.execute(req).await
    }

    // No explicit Content-Type: the multipart boundary header is set by the transport.
    async fn send_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResult<T> {
        let req = self.builder(Method::POST, path).multipart(form);
        self.execute(req).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_empty(Method::GET, path).await
    }

    // auth

    pub async fn login(&self, password: &str) -> ApiResult<Ack> {
        self.send_json(
            Method::POST,
            "/auth/login",
            &LoginRequest {
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn logout(&self) -> ApiResult<Ack> {
        self.send_empty(Method::POST, "/auth/logout").await
    }

    // users

    pub async fn current_user(&self) -> ApiResult<User> {
        self.get("/users/me").await
    }

    pub async fn update_current_user(&self, data: &UserUpdate) -> ApiResult<User> {
        self.send_json(Method::PATCH, "/users/me", data).await
    }

    pub async fn upload_avatar(&self, file: UploadFile) -> ApiResult<User> {
        let form = Form::new().part("file", file.into_part()?);
        self.send_multipart("/users/me/avatar", form).await
    }

    // hobbies

    pub async fn hobbies(&self, parent_id: Option<i64>) -> ApiResult<Vec<Hobby>> {
        match parent_id {
            Some(id) => self.get(&format!("/hobbies?parent_id={id}")).await,
            None => self.get("/hobbies").await,
        }
    }

    pub async fn hobby_tree(&self) -> ApiResult<Vec<Hobby>> {
        self.get("/hobbies/tree").await
    }

    pub async fn hobby(&self, id: i64) -> ApiResult<Hobby> {
        self.get(&format!("/hobbies/{id}")).await
    }

    pub async fn hobby_children(&self, id: i64) -> ApiResult<Vec<Hobby>> {
        self.get(&format!("/hobbies/{id}/children")).await
    }

    pub async fn create_hobby(&self, data: &HobbyCreate) -> ApiResult<Hobby> {
        self.send_json(Method::POST, "/hobbies", data).await
    }

    pub async fn update_hobby(&self, id: i64, data: &HobbyUpdate) -> ApiResult<Hobby> {
        self.send_json(Method::PATCH, &format!("/hobbies/{id}"), data)
            .await
    }

    pub async fn delete_hobby(&self, id: i64) -> ApiResult<Ack> {
        self.send_empty(Method::DELETE, &format!("/hobbies/{id}"))
            .await
    }

    // hobby types

    pub async fn hobby_types(&self) -> ApiResult<Vec<HobbyType>> {
        self.get("/hobby-types").await
    }

    pub async fn create_hobby_type(&self, data: &HobbyTypeCreate) -> ApiResult<HobbyType> {
        self.send_json(Method::POST, "/hobby-types", data).await
    }

    pub async fn update_hobby_type(
        &self,
        key: &str,
        data: &HobbyTypeUpdate,
    ) -> ApiResult<HobbyType> {
        self.send_json(
            Method::PATCH,
            &format!("/hobby-types/{}", encode_segment(key)),
            data,
        )
        .await
    }

    pub async fn delete_hobby_type(&self, key: &str) -> ApiResult<Ack> {
        self.send_empty(
            Method::DELETE,
            &format!("/hobby-types/{}", encode_segment(key)),
        )
        .await
    }

    // entries

    pub async fn entries(&self, query: &EntryQuery) -> ApiResult<Page<EntryListItem>> {
        self.get(&format!("/entries{}", query.to_query_string()))
            .await
    }

    pub async fn entry(&self, id: i64) -> ApiResult<Entry> {
        self.get(&format!("/entries/{id}")).await
    }

    pub async fn create_entry(&self, data: &EntryCreate) -> ApiResult<Entry> {
        self.send_json(Method::POST, "/entries", data).await
    }

    pub async fn update_entry(&self, id: i64, data: &EntryUpdate) -> ApiResult<Entry> {
        self.send_json(Method::PATCH, &format!("/entries/{id}"), data)
            .await
    }

    pub async fn delete_entry(&self, id: i64) -> ApiResult<Ack> {
        self.send_empty(Method::DELETE, &format!("/entries/{id}"))
            .await
    }

    // entry properties

    pub async fn entry_props(&self, entry_id: i64) -> ApiResult<Vec<EntryProp>> {
        self.get(&format!("/entries/{entry_id}/props")).await
    }

    /// Full replacement: keys missing from `props` are removed server-side.
    pub async fn set_entry_props(
        &self,
        entry_id: i64,
        props: &[PropValue],
    ) -> ApiResult<Vec<EntryProp>> {
        self.send_json(
            Method::POST,
            &format!("/entries/{entry_id}/props"),
            &PropsReplace { props },
        )
        .await
    }

    pub async fn delete_entry_prop(&self, entry_id: i64, key: &str) -> ApiResult<Ack> {
        self.send_empty(
            Method::DELETE,
            &format!("/entries/{entry_id}/props/{}", encode_segment(key)),
        )
        .await
    }

    // entry media

    pub async fn entry_media(&self, entry_id: i64) -> ApiResult<Vec<EntryMedia>> {
        self.get(&format!("/entries/{entry_id}/media")).await
    }

    pub async fn upload_media(
        &self,
        entry_id: i64,
        file: UploadFile,
        kind: Option<MediaKind>,
    ) -> ApiResult<EntryMedia> {
        let mut form = Form::new().part("file", file.into_part()?);
        if let Some(kind) = kind {
            form = form.text("kind", kind.to_string());
        }
        self.send_multipart(&format!("/entries/{entry_id}/media"), form)
            .await
    }

    pub async fn delete_media(&self, entry_id: i64, media_id: i64) -> ApiResult<Ack> {
        self.send_empty(
            Method::DELETE,
            &format!("/entries/{entry_id}/media/{media_id}"),
        )
        .await
    }

    // search

    pub async fn search(&self, query: &EntryQuery) -> ApiResult<Page<EntryListItem>> {
        self.get(&format!("/search{}", query.to_query_string()))
            .await
    }

    // export

    /// Download link for a full data export. Opened directly by the browser.
    pub fn export_url(&self, format: ExportFormat) -> String {
        self.url(&format!("/export?format={format}"))
    }
}

/// Absolute URL for a backend-relative upload path such as `/uploads/7/a.jpg`.
pub(crate) fn media_url(base_url: &str, file_path: &str) -> String {
    if file_path.starts_with("http://") || file_path.starts_with("https://") {
        return file_path.to_string();
    }
    match base_url.find("://") {
        Some(scheme_end) => {
            let host_end = base_url[scheme_end + 3..]
                .find('/')
                .map(|i| scheme_end + 3 + i)
                .unwrap_or(base_url.len());
            format!("{}{}", &base_url[..host_end], file_path)
        }
        None => file_path.to_string(),
    }
}

/// Await a write, then the re-fetch that reflects it. The re-fetch only starts once the
/// write succeeded, and its result is what the caller commits to view state.
pub(crate) async fn write_then_reload<W, T, R>(
    write: impl Future<Output = ApiResult<W>>,
    reload: impl FnOnce(W) -> R,
) -> ApiResult<T>
where
    R: Future<Output = ApiResult<T>>,
{
    let written = write.await?;
    reload(written).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::future::ready;

    #[test]
    fn not_found_body_decodes_code_and_message() {
        let err = decode_error(
            404,
            r#"{"status": 404, "code": "NOT_FOUND", "message": "Entry not found"}"#,
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.code(), Some("NOT_FOUND"));
        assert_eq!(err.to_string(), "Entry not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn unparseable_error_body_falls_back_to_status_line() {
        let err = decode_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.code(), Some(UNKNOWN_ERROR_CODE));
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway");
    }

    #[test]
    fn framework_detail_is_used_as_message() {
        let err = decode_error(401, r#"{"detail": "Not authenticated"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), Some(UNKNOWN_ERROR_CODE));
        assert_eq!(err.to_string(), "Not authenticated");
    }

    #[test]
    fn validation_detail_list_is_kept_as_details() {
        let err = decode_error(
            422,
            r#"{"detail": [{"loc": ["body", "hobby_id"], "msg": "field required"}]}"#,
        );
        match err {
            ApiError::Http {
                status,
                message,
                details,
                ..
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "HTTP 422 Unprocessable Entity");
                assert!(details.is_some_and(|d| d.is_array()));
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[test]
    fn no_content_decodes_as_empty_ack() {
        let ack: Ack = decode_success(204, "").expect("204 should decode");
        assert_eq!(ack, Ack::default());
    }

    #[test]
    fn delete_ack_message_is_kept() {
        let ack: Ack =
            decode_success(200, r#"{"message": "Entry deleted"}"#).expect("ack should decode");
        assert_eq!(ack.message.as_deref(), Some("Entry deleted"));
    }

    #[test]
    fn malformed_success_body_is_a_parse_error() {
        let res: ApiResult<Vec<Hobby>> = decode_success(200, r#"{"oops": true}"#);
        assert!(matches!(res, Err(ApiError::Parse(_))));
    }

    #[test]
    fn client_builds_urls_without_double_slashes() {
        let client = ApiClient::new("http://localhost:8000/api/");
        assert_eq!(client.url("/entries/7"), "http://localhost:8000/api/entries/7");
        assert_eq!(
            client.export_url(ExportFormat::Zip),
            "http://localhost:8000/api/export?format=zip"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        assert_eq!(encode_segment("brand link/x"), "brand%20link%2Fx");
    }

    #[test]
    fn media_url_resolves_against_api_origin() {
        assert_eq!(
            media_url("http://localhost:8000/api", "/uploads/1/a.jpg"),
            "http://localhost:8000/uploads/1/a.jpg"
        );
        assert_eq!(media_url("/api", "/uploads/1/a.jpg"), "/uploads/1/a.jpg");
        assert_eq!(
            media_url("/api", "https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn reload_runs_after_a_successful_write() {
        let res: ApiResult<Vec<i64>> = block_on(write_then_reload(
            ready(Ok::<_, ApiError>(7_i64)),
            |written| ready(Ok(vec![written, 8])),
        ));
        assert_eq!(res, Ok(vec![7, 8]));
    }

    #[test]
    fn failed_write_skips_the_reload() {
        let reloaded = Cell::new(false);
        let res: ApiResult<Vec<i64>> = block_on(write_then_reload(
            ready(Err::<i64, _>(ApiError::Network("offline".to_string()))),
            |_| {
                reloaded.set(true);
                ready(Ok(vec![]))
            },
        ));
        assert!(matches!(res, Err(ApiError::Network(_))));
        assert!(!reloaded.get());
    }

    #[test]
    fn failed_reload_is_reported() {
        let res: ApiResult<Vec<i64>> = block_on(write_then_reload(
            ready(Ok::<_, ApiError>(())),
            |_| ready(Err(decode_error(503, ""))),
        ));
        assert_eq!(res.map_err(|e| e.status()), Err(Some(503)));
    }
}
