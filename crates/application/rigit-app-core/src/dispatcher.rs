use std::sync::Arc;

use rigit_core::ValidationError;
use rigit_infra::{ApiClient, ApiError, Endpoint, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::ports::{Notifier, UserNotice};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },
    #[error("{0}")]
    NotAllowed(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<ValidationError> for ActionError {
    fn from(value: ValidationError) -> Self {
        ActionError::Validation {
            missing: value.missing,
        }
    }
}

impl ActionError {
    /// Text for the notice shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ActionError::Validation { missing } => {
                format!("Please fill in all required fields: {}", missing.join(", "))
            }
            ActionError::NotAllowed(reason) => reason.clone(),
            ActionError::Api(ApiError::Unauthorized | ApiError::MissingCredential) => {
                "Authentication failed. Please log in again.".to_string()
            }
            ActionError::Api(ApiError::Transport(_)) => {
                "Network error. Please check your connection.".to_string()
            }
            ActionError::Api(ApiError::Status { message, .. }) => message.clone(),
            ActionError::Api(ApiError::Decode(_)) => {
                "The server sent a response that could not be read.".to_string()
            }
            ActionError::Api(ApiError::InvalidUrl(url)) => format!("Invalid backend address: {url}"),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ActionError::Api(ApiError::Unauthorized | ApiError::MissingCredential)
        )
    }
}

/// One user-triggered mutation: what to send and what to say on success.
#[derive(Debug, Clone)]
pub struct Action {
    label: String,
    method: Method,
    endpoint: Endpoint,
    body: Option<Value>,
    precheck: Result<(), ActionError>,
    success: Option<String>,
}

impl Action {
    pub fn new(label: impl Into<String>, method: Method, endpoint: Endpoint) -> Self {
        Self {
            label: label.into(),
            method,
            endpoint,
            body: None,
            precheck: Ok(()),
            success: None,
        }
    }

    pub fn post(label: impl Into<String>, endpoint: Endpoint) -> Self {
        Self::new(label, Method::POST, endpoint)
    }

    pub fn put(label: impl Into<String>, endpoint: Endpoint) -> Self {
        Self::new(label, Method::PUT, endpoint)
    }

    pub fn delete(label: impl Into<String>, endpoint: Endpoint) -> Self {
        Self::new(label, Method::DELETE, endpoint)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Local check that must pass before anything is sent.
    pub fn requires(mut self, check: Result<(), impl Into<ActionError>>) -> Self {
        if self.precheck.is_ok() {
            self.precheck = check.map_err(Into::into);
        }
        self
    }

    pub fn on_success(mut self, message: impl Into<String>) -> Self {
        self.success = Some(message.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Runs actions in one envelope: local checks, one request, and a notice
/// for every outcome. Never retries.
#[derive(Clone)]
pub struct ActionDispatcher {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl ActionDispatcher {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn notify(&self, notice: UserNotice) {
        self.notifier.notify(notice);
    }

    pub async fn dispatch(&self, action: Action) -> Result<Value, ActionError> {
        let Action {
            label,
            method,
            endpoint,
            body,
            precheck,
            success,
        } = action;

        if let Err(e) = precheck {
            debug!(%label, "action rejected locally: {e}");
            self.report(&label, &e);
            return Err(e);
        }

        match self.client.send(method, &endpoint, body.as_ref()).await {
            Ok(reply) => {
                info!(%label, path = %endpoint.path(), "action succeeded");
                if let Some(message) = success {
                    self.notifier.notify(UserNotice::success(label, message));
                }
                Ok(reply)
            }
            Err(e) => {
                let e = ActionError::from(e);
                self.report(&label, &e);
                Err(e)
            }
        }
    }

    /// Fetches a list for a view. Unlike [`dispatch`](Self::dispatch) this
    /// does not notify; the view reports only if the result is still wanted.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Vec<T>, ActionError> {
        self.client.get_list(endpoint).await.map_err(ActionError::from)
    }

    /// Turns a failure into an error notice.
    pub fn report(&self, label: &str, error: &ActionError) {
        let title = if error.is_auth() {
            "Session expired".to_string()
        } else {
            format!("{label} failed")
        };
        self.notifier
            .notify(UserNotice::error(title, error.user_message()));
    }
}
