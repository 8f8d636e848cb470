/// Entity kind of transaction notifications on the push channel.
pub const TRANSACTION_SUBSCRIPTION: &str = "transaction";

// refresh journal actions
pub const SNAPSHOT_REPLACED: &str = "SNAPSHOT_REPLACED";
pub const REFRESH_SUPERSEDED: &str = "REFRESH_SUPERSEDED";
pub const REFRESH_FAILED: &str = "REFRESH_FAILED";
pub const SUBSCRIBED: &str = "SUBSCRIBED";
pub const SUBSCRIBE_FAILED: &str = "SUBSCRIBE_FAILED";
pub const UNSUBSCRIBED: &str = "UNSUBSCRIBED";
pub const SNAPSHOT_RETIRED: &str = "SNAPSHOT_RETIRED";
