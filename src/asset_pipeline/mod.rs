pub mod loader;
pub mod materials;
pub mod mtl;
pub mod obj;
