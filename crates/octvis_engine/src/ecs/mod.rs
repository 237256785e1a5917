//! Entity-Component-System implementation
//!
//! The store is passed explicitly to every system that needs it; there is no
//! global registry.

pub mod world;
pub mod entity;
pub mod component;
pub mod components;

pub use world::{World, ComponentStorage};
pub use entity::Entity;
pub use component::Component;
