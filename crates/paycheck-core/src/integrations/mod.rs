pub mod aws_auth;
pub mod aws_profile;
pub mod forex;
pub mod harvest;
pub mod sns;
pub mod traits;

pub use forex::{FixedRateConverter, ForexClient};
pub use harvest::HarvestClient;
pub use sns::SnsPublisher;
pub use traits::{CurrencyConverter, MessagePublisher, TimeEntrySource};
