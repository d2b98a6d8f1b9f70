pub mod a001_community;
pub mod a002_membership;
pub mod a003_professional;
pub mod a004_service;
pub mod a005_local;
pub mod a006_session;
pub mod a007_reservation;
pub mod a008_association;
pub mod common;
