//! Transaction construction for the Cardano UTxO ledger

pub mod assembler;
pub mod change;
pub mod coin_selection;
pub mod draft;
pub mod error;
pub mod fees;
pub mod output;
pub mod signer;

pub use assembler::{AssemblerConfig, AssemblerState, PaymentRequest, TransactionAssembler};
pub use draft::{SignedTransaction, TransactionDraft};
pub use error::{SigningError, TxBuilderError};
pub use output::{TransactionOutput, build_output, min_ada_required};
pub use signer::{KeySource, SigningKey};
