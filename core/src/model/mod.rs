// cartkeep/src/model/mod.rs

//! Cart and catalog data types.

pub mod cart;
pub mod product;

pub use cart::{Cart, CartItem, CartView};
pub use product::{slugify, NewProduct, Product, DEFAULT_PRODUCT_IMAGE};
