//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// Generational key: a destroyed entity's id is never confused with a
    /// later entity that reuses the same slot.
    pub struct Entity;
}

impl Entity {
    /// Stable numeric form of the id, for logs and debug labels
    pub fn id(self) -> u64 {
        slotmap::Key::data(&self).as_ffi()
    }
}
