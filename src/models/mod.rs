pub mod alchemy;
pub mod price;
pub mod response;
pub mod transaction;

pub use alchemy::*;
pub use price::*;
pub use response::*;
pub use transaction::*;
