pub mod account;
pub mod audit;
pub mod balance;
pub mod interest;
pub mod notification;
pub mod transaction;
pub mod user;
pub mod view;

pub type GroupId = i64;
pub type AccountId = i64;
pub type UserId = i64;
pub type TransactionId = i64;

pub use account::{Account, AccountType};
pub use audit::RefreshEntry;
pub use balance::{AccountBalance, AccountBalanceSheet};
pub use interest::InterestHandle;
pub use notification::Notification;
pub use transaction::{PurchaseItem, RawTransaction, TransactionState, TransactionType};
pub use user::{CurrentUser, User};
pub use view::{BilledTransaction, EffectiveTransaction};
