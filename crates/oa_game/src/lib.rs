//! Scene simulation for the Our Adventure story: actors, collision,
//! cutscenes, dialogue, the concrete scenes and the scene manager that runs
//! them.

pub mod actor;
pub mod animation;
pub mod assets;
pub mod collision;
pub mod config;
pub mod cutscene;
pub mod dialogue;
pub mod game;
pub mod map;
pub mod render;
pub mod replay;
pub mod scene;
pub mod scenes;
