#[doc(inline)]
pub use rbtree::{self, *};
