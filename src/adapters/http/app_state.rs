use std::sync::Arc;

use crate::{
    application::ports::tenant_directory::TenantDirectory,
    application::use_cases::{
        catalog::PlanCatalog, entitlement::EntitlementUseCases, subscription::SubscriptionUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<PlanCatalog>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub entitlement_use_cases: Arc<EntitlementUseCases>,
    pub tenant_directory: Arc<dyn TenantDirectory>,
}
