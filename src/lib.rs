pub mod body;
pub mod bubbling;
pub mod camera3d;
pub mod config;
pub mod controller;
pub mod drag;
pub mod events;
pub mod fuse;
pub mod gesture;
pub mod hit;
pub mod hover;
pub mod input;
pub(crate) mod picking;
pub mod scene;
pub mod time;

pub use controller::InputController;
pub use events::{EventCategories, EventCategory, EventDelegate, EventHandler};
pub use hit::HitResult;
pub use input::{input_queue, InputEvent, InputQueue, InputSender};
pub use scene::{NodeBounds, NodeId, SceneGraph, SpatialQuery};
