//! Client SDK for a hosted login service: password, social, session-ticket and OAuth2 token
//! flows, with a remember-me gated token store and JWT claim inspection.

pub mod app;
pub mod domain;
pub mod infra;
pub mod login;
pub mod shared;

pub use app::logging::{init as init_logging, LogConfig};
pub use domain::login_record::{AuthToken, LoginRecord, TargetPlatform, UserAttribute};
pub use domain::token_claims::{
    get_parameter, get_provider, get_user_id, is_master_account, lookup_bool_claim,
    lookup_string_claim, ClaimLookup, TokenClaims, TokenDecodeError,
};
pub use infra::login_store::{FileLoginStore, LoginStore, MemoryLoginStore};
pub use infra::settings::{LoginSettings, UserDataStorage};
pub use login::client::{LoginClient, LoginClientBuilder};
pub use login::endpoints::{EndpointRegistry, Operation, ProtocolKind};
pub use login::platform::{NativePlatformAuth, PlatformAuthFlag};
pub use login::redirect::{generate_state, SocialRedirect};
pub use login::request::{HttpMethod, RequestBuilder, RequestDescriptor, Telemetry};
pub use login::response::classify;
pub use login::transport::{
    HttpTransport, ReqwestTransport, TransportFailure, TransportFuture, TransportResponse,
};
pub use shared::error::{ErrorKind, OperationError, OperationResult, NO_CONTENT_CODE};
pub use shared::json_fields::FieldLookup;
