pub mod enums;
pub mod favorites;
pub mod properties;
pub mod property_images;
pub mod users;

pub use favorites::Entity as Favorites;
pub use properties::Entity as Properties;
pub use property_images::Entity as PropertyImages;
pub use users::Entity as Users;
