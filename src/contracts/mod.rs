//! Validator clients

pub mod escrow;
pub mod hello_world;

pub use escrow::{
    create_escrow_datum, create_escrow_redeemer, EscrowAction, EscrowConfig, EscrowContract,
    EscrowState, EscrowUtxo, LockResult,
};
pub use hello_world::{hello_world_datum, hello_world_redeemer, HelloWorldContract};
