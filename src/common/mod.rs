pub mod conversions;
pub mod kalman;
pub mod params;
pub mod realtime;
