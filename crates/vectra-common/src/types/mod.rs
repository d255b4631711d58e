//! Core data types for Vectra

pub mod integration_log;
pub mod quotation;
pub mod tariff;
