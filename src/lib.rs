pub mod caption;
pub mod corners;
pub mod error;
pub mod export;
pub mod logo;
pub mod pipeline;
pub mod qr;
pub mod render;
pub mod style;

pub use error::{Result, StudioError};
pub use pipeline::{generate, Generation, GenerationState, Studio};
pub use style::{LogoSettings, ModuleStyle, StyleParameters};
