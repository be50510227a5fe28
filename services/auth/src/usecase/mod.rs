pub mod audit;
pub mod notification;
pub mod otp;
pub mod session;
