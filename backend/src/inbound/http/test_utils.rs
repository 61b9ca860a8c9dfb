//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};
use std::sync::Arc;

use crate::domain::ports::{
    MockLoginService, MockRecipeCommand, MockRecipeQuery, MockTaxonomyCommand, MockTaxonomyQuery,
    MockUserAccounts,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// User id stored by [`sign_in`].
pub const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Path the sign-in helper is mounted at by handler tests.
pub const SIGN_IN_PATH: &str = "/test/sign-in";

/// Session middleware with a fresh key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
///
/// # Panics
///
/// Panics when the response did not set a session cookie.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// The id behind [`TEST_USER_ID`].
///
/// # Panics
///
/// Never in practice; the constant is a valid UUID.
pub fn test_user_id() -> UserId {
    UserId::new(TEST_USER_ID).expect("fixture user id")
}

/// Handler that authenticates the session as [`TEST_USER_ID`] without
/// touching the login port.
pub async fn sign_in(session: SessionContext) -> Result<HttpResponse, Error> {
    session.persist_user(&test_user_id())?;
    Ok(HttpResponse::NoContent().finish())
}

/// Call [`SIGN_IN_PATH`] and return the resulting session cookie.
///
/// # Panics
///
/// Panics when the app does not mount [`sign_in`].
pub async fn signed_in_cookie<S>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, test::TestRequest::get().uri(SIGN_IN_PATH).to_request())
        .await;
    session_cookie(&res)
}

/// Mock driving ports; configure expectations, then convert into state.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub accounts: MockUserAccounts,
    pub taxonomy: MockTaxonomyCommand,
    pub taxonomy_query: MockTaxonomyQuery,
    pub recipes: MockRecipeCommand,
    pub recipes_query: MockRecipeQuery,
}

impl MockPorts {
    /// Wrap the mocks as shared handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            taxonomy: Arc::new(self.taxonomy),
            taxonomy_query: Arc::new(self.taxonomy_query),
            recipes: Arc::new(self.recipes),
            recipes_query: Arc::new(self.recipes_query),
        }))
    }
}
