//! cmi-core: journal row model, amount grammar, and the settlement accounting rule

pub mod amount;
pub mod model;
pub mod rules;
pub mod session;

pub use amount::{Amount, AmountError};
pub use model::{JournalRow, RemittanceGroup, RowKind, Side};
pub use rules::{check_rows, journalize, third_party_account, RuleViolation};
pub use session::{Completion, Session, SessionState};
