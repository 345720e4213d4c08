pub mod bit_array;
pub mod recency_list;
pub mod slot_arena;

pub use bit_array::BitArray;
pub use recency_list::RecencyList;
pub use slot_arena::{SlotArena, SlotId};
