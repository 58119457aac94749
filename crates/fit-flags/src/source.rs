//! The remote side of the flag cache.

use std::fmt::Display;
use std::sync::Arc;

use fit_core::entities::FeatureFlag;
use fit_db::error::DatabaseError;
use fit_db::service::FitService;

/// Authoritative flag storage.
#[allow(async_fn_in_trait)]
pub trait FlagSource {
    type Error: Display;

    /// `Ok(None)` when no flag with that name exists.
    async fn fetch_flag(&self, name: &str) -> Result<Option<FeatureFlag>, Self::Error>;

    async fn set_flag_enabled(
        &self,
        name: &str,
        enabled: bool,
        updated_by: Option<&str>,
    ) -> Result<(), Self::Error>;

    async fn insert_flag(
        &self,
        name: &str,
        enabled: bool,
        description: Option<&str>,
    ) -> Result<FeatureFlag, Self::Error>;

    async fn list_flags(&self) -> Result<Vec<FeatureFlag>, Self::Error>;
}

impl FlagSource for FitService {
    type Error = DatabaseError;

    async fn fetch_flag(&self, name: &str) -> Result<Option<FeatureFlag>, DatabaseError> {
        self.get_flag(name).await
    }

    async fn set_flag_enabled(
        &self,
        name: &str,
        enabled: bool,
        updated_by: Option<&str>,
    ) -> Result<(), DatabaseError> {
        Self::set_flag_enabled(self, name, enabled, updated_by).await
    }

    async fn insert_flag(
        &self,
        name: &str,
        enabled: bool,
        description: Option<&str>,
    ) -> Result<FeatureFlag, DatabaseError> {
        self.create_flag(name, enabled, description).await
    }

    async fn list_flags(&self) -> Result<Vec<FeatureFlag>, DatabaseError> {
        Self::list_flags(self).await
    }
}

impl<S: FlagSource> FlagSource for &S {
    type Error = S::Error;

    async fn fetch_flag(&self, name: &str) -> Result<Option<FeatureFlag>, Self::Error> {
        (**self).fetch_flag(name).await
    }

    async fn set_flag_enabled(
        &self,
        name: &str,
        enabled: bool,
        updated_by: Option<&str>,
    ) -> Result<(), Self::Error> {
        (**self).set_flag_enabled(name, enabled, updated_by).await
    }

    async fn insert_flag(
        &self,
        name: &str,
        enabled: bool,
        description: Option<&str>,
    ) -> Result<FeatureFlag, Self::Error> {
        (**self).insert_flag(name, enabled, description).await
    }

    async fn list_flags(&self) -> Result<Vec<FeatureFlag>, Self::Error> {
        (**self).list_flags().await
    }
}

impl<S: FlagSource> FlagSource for Arc<S> {
    type Error = S::Error;

    async fn fetch_flag(&self, name: &str) -> Result<Option<FeatureFlag>, Self::Error> {
        (**self).fetch_flag(name).await
    }

    async fn set_flag_enabled(
        &self,
        name: &str,
        enabled: bool,
        updated_by: Option<&str>,
    ) -> Result<(), Self::Error> {
        (**self).set_flag_enabled(name, enabled, updated_by).await
    }

    async fn insert_flag(
        &self,
        name: &str,
        enabled: bool,
        description: Option<&str>,
    ) -> Result<FeatureFlag, Self::Error> {
        (**self).insert_flag(name, enabled, description).await
    }

    async fn list_flags(&self) -> Result<Vec<FeatureFlag>, Self::Error> {
        (**self).list_flags().await
    }
}
