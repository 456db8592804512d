pub mod decision;
pub mod disease;
pub mod forecast;
pub mod metrics;
pub mod reading;

pub use decision::*;
pub use disease::*;
pub use forecast::*;
pub use metrics::*;
pub use reading::*;
