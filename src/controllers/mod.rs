pub mod auth_controller;
pub mod batch_controller;
pub mod upload_controller;
pub mod user_controller;
pub mod vehicle_controller;

pub use auth_controller::AuthController;
pub use batch_controller::BatchController;
pub use upload_controller::UploadController;
pub use user_controller::UserController;
pub use vehicle_controller::VehicleController;
