pub mod entitlement;
pub mod notification;
pub mod plan;
pub mod subscription;
