pub mod banner;
pub mod booking;
pub mod payment;
pub mod responses;
pub mod stats;
pub mod test_item;
pub mod user;

pub use banner::*;
pub use booking::*;
pub use payment::*;
pub use responses::*;
pub use stats::*;
pub use test_item::*;
pub use user::*;
