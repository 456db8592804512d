pub mod device_api;
pub mod openweathermap;

pub use device_api::DeviceApiClient;
pub use openweathermap::OpenWeatherMapClient;
