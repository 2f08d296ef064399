// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod basics;
pub mod ids;
pub mod model;
pub mod roster;
pub mod state;

pub use basics::*;
pub use ids::*;
pub use model::*;
pub use roster::*;
pub use state::*;
