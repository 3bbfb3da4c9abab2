//! Plutus data, validator scripts and the Aiken blueprint

pub mod blueprint;
pub mod data;
pub mod script;

pub use blueprint::{Blueprint, BlueprintValidator};
pub use data::PlutusData;
pub use script::{PlutusScript, PlutusVersion};
