pub mod meal;
pub mod meal_request;
pub mod payment;
pub mod user;

pub use meal::*;
pub use meal_request::*;
pub use payment::*;
pub use user::*;
