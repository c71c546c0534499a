//! Identity provider adapter backed by a brokered popup.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::popup_broker::{PopupBroker, PopupId};
use crate::domain::entities::{BearerToken, Identity};
use crate::domain::repositories::{IdentityProvider, ProviderError};

/// Signs in through one popup registered with a [`PopupBroker`].
///
/// The provider returns a freshly issued token together with the identity
/// when the popup completes; [`IdentityProvider::fresh_token`] hands that
/// token out for the matching identity.
pub struct PopupIdentityProvider {
    broker: Arc<PopupBroker>,
    popup: PopupId,
    issued: Mutex<Option<(Identity, BearerToken)>>,
}

impl PopupIdentityProvider {
    pub fn new(broker: Arc<PopupBroker>, popup: PopupId) -> Self {
        Self {
            broker,
            popup,
            issued: Mutex::new(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for PopupIdentityProvider {
    async fn sign_in_with_popup(&self) -> Result<Identity, ProviderError> {
        let result = self.broker.wait(&self.popup).await?;

        let mut issued = match self.issued.lock() {
            Ok(issued) => issued,
            Err(poisoned) => poisoned.into_inner(),
        };
        *issued = Some((result.identity.clone(), result.token));

        Ok(result.identity)
    }

    async fn fresh_token(&self, identity: &Identity) -> Result<BearerToken, ProviderError> {
        let issued = match self.issued.lock() {
            Ok(issued) => issued,
            Err(poisoned) => poisoned.into_inner(),
        };

        match issued.as_ref() {
            Some((owner, token)) if owner.uid() == identity.uid() => Ok(token.clone()),
            _ => Err(ProviderError::TokenUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserId;
    use crate::infrastructure::identity::PopupResult;
    use std::time::Duration;

    fn identity(uid: &str) -> Identity {
        Identity::new(UserId::new(uid).unwrap(), None, None)
    }

    #[tokio::test]
    async fn test_sign_in_then_fresh_token() {
        let broker = Arc::new(PopupBroker::new(Duration::from_secs(60)));
        let popup = broker.open();
        broker.resolve(
            &popup,
            PopupResult {
                identity: identity("u1"),
                token: BearerToken::new("tok123").unwrap(),
            },
        );

        let provider = PopupIdentityProvider::new(broker, popup);

        let signed_in = provider.sign_in_with_popup().await.unwrap();
        let token = provider.fresh_token(&signed_in).await.unwrap();

        assert_eq!(signed_in.uid().as_str(), "u1");
        assert_eq!(token.expose(), "tok123");
    }

    #[tokio::test]
    async fn test_fresh_token_requires_matching_sign_in() {
        let broker = Arc::new(PopupBroker::new(Duration::from_secs(60)));
        let provider = PopupIdentityProvider::new(broker, PopupId::parse(&"a".repeat(32)).unwrap());

        assert!(matches!(
            provider.fresh_token(&identity("u1")).await,
            Err(ProviderError::TokenUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_rejected_popup_propagates_provider_error() {
        let broker = Arc::new(PopupBroker::new(Duration::from_secs(60)));
        let popup = broker.open();
        broker.reject(&popup, ProviderError::PopupClosedByUser);

        let provider = PopupIdentityProvider::new(broker, popup);

        assert!(matches!(
            provider.sign_in_with_popup().await,
            Err(ProviderError::PopupClosedByUser)
        ));
    }
}
