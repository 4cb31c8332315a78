// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod filters;
pub mod ids;
pub mod limiter;
pub mod model;
pub mod query;
pub mod schedule;
pub mod settings;
pub mod state;
pub mod window;

pub use filters::*;
pub use ids::*;
pub use limiter::*;
pub use model::*;
pub use query::*;
pub use schedule::*;
pub use settings::*;
pub use state::*;
pub use window::*;
