pub mod batch_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use batch_repository::{BatchRepository, BatchWithCount};
pub use user_repository::{NewUser, UserChanges, UserFilter, UserRepository};
pub use vehicle_repository::{VehicleFilter, VehicleRepository, VehicleStats};
