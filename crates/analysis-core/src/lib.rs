pub mod error;
pub mod fundamentals;
pub mod series;
pub mod traits;
pub mod types;

pub use error::*;
pub use fundamentals::*;
pub use series::*;
pub use traits::*;
pub use types::*;
