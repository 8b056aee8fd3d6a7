mod blocks;
mod cell;
mod doors;
mod events;
mod grid;
mod layout;
mod persist;
mod room;
mod session;
mod spawns;
mod spells;

pub use blocks::*;
pub use cell::*;
pub use doors::*;
pub use events::*;
pub use grid::*;
pub use layout::*;
pub use persist::*;
pub use room::*;
pub use session::*;
pub use spawns::*;
pub use spells::*;
