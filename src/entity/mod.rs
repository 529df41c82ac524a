pub mod category;

pub use category::Entity as CategoryEntity;
