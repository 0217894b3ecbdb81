use storage::LocalStore;
use visa_core::model::{UserProfile, UserProfileDraft};

use crate::error::ProfileServiceError;

#[derive(Clone)]
pub struct ProfileService {
    store: LocalStore,
}

impl ProfileService {
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Load the saved profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError` on storage failures.
    pub async fn load(&self) -> Result<Option<UserProfile>, ProfileServiceError> {
        Ok(self.store.load_profile().await?)
    }

    /// Validate and persist a profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError` if validation fails or persistence fails.
    pub async fn save(&self, draft: UserProfileDraft) -> Result<UserProfile, ProfileServiceError> {
        let profile = draft.validate()?;
        self.store.save_profile(&profile).await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storage::repository::InMemoryStore;
    use visa_core::model::{ProfileError, VisaSubclass};

    #[tokio::test]
    async fn save_validates_then_persists() {
        let service = ProfileService::new(LocalStore::new(Arc::new(InMemoryStore::new())));
        assert!(service.load().await.unwrap().is_none());

        let err = service
            .save(UserProfileDraft {
                full_name: "Alex".into(),
                email: "nope".into(),
                ..UserProfileDraft::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileServiceError::Profile(ProfileError::InvalidEmail(_))
        ));
        assert!(service.load().await.unwrap().is_none());

        service
            .save(UserProfileDraft {
                id: "user-1".into(),
                full_name: "Alex Doe".into(),
                email: "Alex@Example.com".into(),
                visa_subclass: VisaSubclass::Offshore309,
                ..UserProfileDraft::default()
            })
            .await
            .unwrap();
        let loaded = service.load().await.unwrap().unwrap();
        assert_eq!(loaded.email(), "alex@example.com");
        assert_eq!(loaded.visa_subclass(), VisaSubclass::Offshore309);
    }
}
