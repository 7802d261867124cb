pub mod classes;
pub mod f32;
pub mod io;

pub use self::classes::ClassField;
pub use self::f32::ImageF32;
