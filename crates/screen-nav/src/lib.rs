//! Query handling over the screen index: interpretation, weighted scoring,
//! result refinement, per-caller disambiguation and TOON output.

pub mod format;
pub mod interpret;
pub mod refine;
pub mod score;
pub mod session;
