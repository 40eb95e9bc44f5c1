use std::collections::HashMap;
use std::path::Path;

use crate::application::app_error::{AppError, AppResult};
use crate::domain::entities::plan::{Plan, PlanFeature};

/// Static plan catalog. Read-only at runtime: changes are deployed as
/// configuration (a JSON file), never through an API.
#[derive(Debug)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
    by_id: HashMap<String, usize>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> AppResult<Self> {
        let mut by_id = HashMap::with_capacity(plans.len());
        for (idx, plan) in plans.iter().enumerate() {
            if plan.period_days <= 0 {
                return Err(AppError::InvalidInput(format!(
                    "plan {} has a non-positive period",
                    plan.id
                )));
            }
            if plan.trial_days < 0 {
                return Err(AppError::InvalidInput(format!(
                    "plan {} has a negative trial length",
                    plan.id
                )));
            }
            if by_id.insert(plan.id.clone(), idx).is_some() {
                return Err(AppError::InvalidInput(format!(
                    "duplicate plan id {}",
                    plan.id
                )));
            }
        }
        Ok(Self { plans, by_id })
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::InvalidInput(format!("cannot read plan catalog: {e}")))?;
        let plans: Vec<Plan> = serde_json::from_str(&raw)
            .map_err(|e| AppError::InvalidInput(format!("invalid plan catalog: {e}")))?;
        Self::new(plans)
    }

    pub fn get_plan(&self, id: &str) -> AppResult<&Plan> {
        self.by_id
            .get(id)
            .map(|&idx| &self.plans[idx])
            .ok_or_else(|| AppError::PlanNotFound(id.to_string()))
    }

    /// Plans in their configured order.
    pub fn list_plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Built-in clinic plans used when no catalog file is configured.
    pub fn builtin() -> Self {
        let plans = vec![
            Plan {
                id: "clinic-trial".into(),
                name: "Trial".into(),
                features: vec![
                    PlanFeature::new("patients"),
                    PlanFeature::new("appointments"),
                ],
                quotas: HashMap::from([
                    ("max_active_users".into(), 2),
                    ("max_records".into(), 100),
                ]),
                period_days: 30,
                trial_days: 14,
            },
            Plan {
                id: "clinic-basic".into(),
                name: "Basic".into(),
                features: vec![
                    PlanFeature::new("patients"),
                    PlanFeature::new("appointments"),
                    PlanFeature::full_service("reports"),
                ],
                quotas: HashMap::from([
                    ("max_active_users".into(), 5),
                    ("max_records".into(), 5_000),
                ]),
                period_days: 30,
                trial_days: 0,
            },
            Plan {
                id: "clinic-pro".into(),
                name: "Pro".into(),
                features: vec![
                    PlanFeature::new("patients"),
                    PlanFeature::new("appointments"),
                    PlanFeature::full_service("reports"),
                    PlanFeature::full_service("inventory"),
                    PlanFeature::new("multi_branch"),
                ],
                quotas: HashMap::from([
                    ("max_active_users".into(), 25),
                    ("max_records".into(), 100_000),
                ]),
                period_days: 30,
                trial_days: 0,
            },
        ];
        Self::new(plans).expect("builtin catalog is valid")
    }
}
