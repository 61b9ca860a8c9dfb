//! Shared harness for HTTP integration tests.
//!
//! Assembles the real services over the in-memory adapter and a temporary
//! media root, mounted under `/api/v1` behind the session and trace
//! middleware, the same way the server binary does.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test as actix_test, web};
use image::{DynamicImage, ImageFormat, RgbImage};
use recipe_api::Trace;
use recipe_api::domain::ports::UuidImageNames;
use recipe_api::domain::{RecipeService, RecipeServicePorts, TaxonomyService, UserAccountService};
use recipe_api::inbound::http::configure;
use recipe_api::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_api::outbound::media::FsRecipeImageStore;
use recipe_api::outbound::memory::InMemoryPersistence;
use serde_json::{Value, json};
use tempfile::TempDir;

pub(crate) const PASSWORD: &str = "testpass123";

/// One in-memory deployment with its own media directory.
pub(crate) struct RecipeApp {
    media: TempDir,
    state: web::Data<HttpState>,
}

impl RecipeApp {
    pub(crate) fn new() -> Self {
        let media = tempfile::tempdir().expect("media tempdir");
        let images = Arc::new(FsRecipeImageStore::open(media.path()).expect("media root"));
        let store = Arc::new(InMemoryPersistence::new());

        let accounts = Arc::new(UserAccountService::new(Arc::clone(&store)));
        let taxonomy = Arc::new(TaxonomyService::new(Arc::clone(&store)));
        let recipes = Arc::new(RecipeService::new(RecipeServicePorts {
            recipes: Arc::clone(&store),
            taxonomy: store,
            images,
            names: Arc::new(UuidImageNames),
        }));
        let state = web::Data::new(HttpState::new(HttpStatePorts {
            login: accounts.clone(),
            accounts,
            taxonomy: taxonomy.clone(),
            taxonomy_query: taxonomy,
            recipes: recipes.clone(),
            recipes_query: recipes,
        }));
        Self { media, state }
    }

    pub(crate) fn media_root(&self) -> &Path {
        self.media.path()
    }

    pub(crate) fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(configure))
    }
}

/// Status and decoded JSON body (or `Null` for empty bodies).
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) body: Value,
    pub(crate) session: Option<Cookie<'static>>,
}

pub(crate) async fn call<S>(app: &S, request: actix_test::TestRequest) -> Reply
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(app, request.to_request()).await;
    let status = res.status();
    let session = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned);
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    Reply {
        status,
        body,
        session,
    }
}

/// JSON request with an optional session cookie.
pub(crate) fn json_request(
    method: Method,
    uri: &str,
    cookie: Option<&Cookie<'static>>,
    payload: Option<Value>,
) -> actix_test::TestRequest {
    let mut request = actix_test::TestRequest::default().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie.clone());
    }
    if let Some(payload) = payload {
        request = request.set_json(payload);
    }
    request
}

/// Register `email` and return the session cookie from logging in.
pub(crate) async fn given_signed_in_user<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let credentials = json!({"email": email, "password": PASSWORD});
    let created = call(
        app,
        json_request(Method::POST, "/api/v1/users", None, Some(credentials.clone())),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);

    let login = call(
        app,
        json_request(Method::POST, "/api/v1/login", None, Some(credentials)),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK, "{}", login.body);
    login.session.expect("session cookie")
}

/// Create a tag or ingredient and return its id.
pub(crate) async fn given_taxonomy_item<S>(
    app: &S,
    cookie: &Cookie<'static>,
    kind: &str,
    name: &str,
) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let reply = call(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/{kind}"),
            Some(cookie),
            Some(json!({"name": name})),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["id"].as_i64().expect("numeric id")
}

/// Create a recipe from a JSON payload and return its id.
pub(crate) async fn given_recipe<S>(app: &S, cookie: &Cookie<'static>, payload: Value) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let reply = call(
        app,
        json_request(Method::POST, "/api/v1/recipes", Some(cookie), Some(payload)),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["id"].as_i64().expect("numeric id")
}

/// Minimal recipe payload with the given title and no relations.
pub(crate) fn recipe_payload(title: &str) -> Value {
    json!({"title": title, "timeMinutes": 5, "price": "5.00"})
}

/// A small encoded raster image.
pub(crate) fn sample_image(format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(10, 10))
        .write_to(&mut buffer, format)
        .expect("encode sample image");
    buffer.into_inner()
}

/// Upload request for a recipe image.
pub(crate) fn upload_request(
    recipe_id: i64,
    cookie: &Cookie<'static>,
    filename: Option<&str>,
    bytes: Vec<u8>,
) -> actix_test::TestRequest {
    let mut request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/recipes/{recipe_id}/upload-image"))
        .cookie(cookie.clone())
        .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
        .set_payload(bytes);
    if let Some(filename) = filename {
        request = request.insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ));
    }
    request
}
