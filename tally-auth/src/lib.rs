mod auth_client;
mod error;
mod login_email;
pub mod refresh;
mod session;
mod settings;

pub use auth_client::{is_auth_endpoint, AuthClient, Credentials, REISSUE_MARKER_HEADER};
pub use error::{AuthError, RefreshError};
pub use login_email::LoginEmailStore;
pub use refresh::{Attempt, Authenticator, RefreshCoordinator, Reissuer, Unauthorized};
pub use session::{Session, SessionState, DEFAULT_LOGIN_PATH};
pub use settings::Settings;
