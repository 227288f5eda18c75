pub mod center;

pub use center::NotificationCenter;
