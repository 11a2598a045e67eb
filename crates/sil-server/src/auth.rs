use async_trait::async_trait;

use crate::error::ApiError;

/// Who is calling. Attached to the request by the auth middleware so
/// handlers can attribute ledger writes.
#[derive(Clone, Debug)]
pub struct Identity {
    pub actor_id: Option<i64>,
    pub name: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn admin(actor_id: i64, name: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id),
            name: name.into(),
            is_admin: true,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate and authorize for the admin surface. Everything under
    /// `/blockchain` except the public verify endpoint requires this.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, ApiError>;
}

/// Single shared bearer token mapped to one administrative actor.
pub struct StaticTokenAuth {
    token: String,
    actor_id: i64,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>, actor_id: i64) -> Self {
        Self {
            token: token.into(),
            actor_id,
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        match credentials {
            Credentials::Bearer(token) if *token == self.token => {
                Ok(Identity::admin(self.actor_id, "admin"))
            }
            Credentials::Bearer(_) => Err(ApiError::Unauthorized("invalid token".into())),
            Credentials::Anonymous => {
                Err(ApiError::Unauthorized("authentication required".into()))
            }
        }
    }
}

/// Rejects every credential. Used when no admin token is configured: the
/// admin surface stays locked while the public verify endpoint keeps
/// working.
pub struct DisabledAuth;

#[async_trait]
impl AuthProvider for DisabledAuth {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Identity, ApiError> {
        Err(ApiError::Unauthorized("admin surface is disabled".into()))
    }
}

/// Accepts everything as an administrative session. For tests and local
/// demos only.
pub struct AllowAllAuth {
    actor_id: i64,
}

impl AllowAllAuth {
    pub fn new(actor_id: i64) -> Self {
        Self { actor_id }
    }
}

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Identity, ApiError> {
        Ok(Identity::admin(self.actor_id, "admin"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_accepts_matching_bearer() {
        let auth = StaticTokenAuth::new("secret", 100);
        let identity = auth
            .authenticate(&Credentials::Bearer("secret".into()))
            .await
            .unwrap();
        assert!(identity.is_admin);
        assert_eq!(identity.actor_id, Some(100));
    }

    #[tokio::test]
    async fn static_token_rejects_wrong_bearer() {
        let auth = StaticTokenAuth::new("secret", 100);
        let error = auth
            .authenticate(&Credentials::Bearer("guess".into()))
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn static_token_rejects_anonymous() {
        let auth = StaticTokenAuth::new("secret", 100);
        assert!(auth.authenticate(&Credentials::Anonymous).await.is_err());
    }

    #[tokio::test]
    async fn allow_all_admits_anonymous() {
        let auth = AllowAllAuth::new(1);
        let identity = auth.authenticate(&Credentials::Anonymous).await.unwrap();
        assert!(identity.is_admin);
    }
}
