pub mod catalog;
pub mod entitlement;
pub mod subscription;
