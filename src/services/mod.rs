pub mod auth_service;
pub mod like_service;
pub mod motto_service;
pub mod qr_service;
pub mod role_service;
