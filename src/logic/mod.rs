pub mod advisory;
pub mod diseases;
pub mod spray;
pub mod wetness;
pub mod window;

pub use advisory::AdvisoryService;
