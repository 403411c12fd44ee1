//! Services behind the gateway receive `x-soko-user-id` when the caller is
//! signed in. Tests inject it directly.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use soko_core::identity::X_SOKO_USER_ID;

pub struct MockIdentity {
    pub user_id: Uuid,
}

impl MockIdentity {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_SOKO_USER_ID),
            HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
        );
        map
    }
}
