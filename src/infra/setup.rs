use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    application::ports::{
        notification_sink::NotificationSink, subscription_store::SubscriptionStore,
        tenant_directory::TenantDirectory, usage_reader::UsageReader,
    },
    application::use_cases::{
        catalog::PlanCatalog,
        entitlement::EntitlementUseCases,
        subscription::{LifecyclePolicy, SubscriptionUseCases},
    },
    infra::{
        config::AppConfig,
        db::init_db,
        error::InfraError,
        expiry_scanner::{ExpiryScanner, ScanPolicy},
        notify::{TracingNotificationSink, WebhookNotificationSink},
    },
};

pub async fn init_app_state() -> anyhow::Result<(AppState, Arc<ExpiryScanner>)> {
    let config = AppConfig::from_env();

    let catalog = Arc::new(match &config.plan_catalog_path {
        Some(path) => PlanCatalog::from_file(path)
            .map_err(|e| InfraError::PlanCatalog(format!("{}: {e}", path.display())))?,
        None => PlanCatalog::builtin(),
    });

    let pool = init_db(&config.database_url).await?;
    let persistence = Arc::new(PostgresPersistence::new(pool));
    let store = persistence.clone() as Arc<dyn SubscriptionStore>;
    let usage = persistence.clone() as Arc<dyn UsageReader>;
    let directory = persistence.clone() as Arc<dyn TenantDirectory>;

    let sink: Arc<dyn NotificationSink> = match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotificationSink::new(url.clone())),
        None => Arc::new(TracingNotificationSink),
    };

    let policy = LifecyclePolicy {
        grace_window: config.grace_window(),
        cas_max_retries: config.cas_max_retries,
    };

    let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
        store.clone(),
        catalog.clone(),
        policy,
    ));
    let entitlement_use_cases = Arc::new(EntitlementUseCases::new(
        store.clone(),
        catalog.clone(),
        usage,
        config.grace_window(),
    ));

    let scanner = Arc::new(ExpiryScanner::new(
        store,
        sink,
        ScanPolicy {
            grace_window: config.grace_window(),
            lookahead: config.scan_lookahead(),
            warning_days: config.expiry_warning_days.clone(),
            page_size: config.scan_page_size,
        },
    ));

    let app_state = AppState {
        config: Arc::new(config),
        catalog,
        subscription_use_cases,
        entitlement_use_cases,
        tenant_directory: directory,
    };

    Ok((app_state, scanner))
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "cliniq=debug,tower_http=info".into());

    let console_layer = fmt::layer().with_target(false).with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
