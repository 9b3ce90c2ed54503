//! Parametric image sources evaluated per grid index.
//!
//! - [`ButterworthSource`]: Butterworth lowpass magnitude around the center of
//!   the index grid.
//! - [`SinusoidSource`]: plane-wave sinusoid over physical coordinates.

pub mod butterworth;
pub mod sinusoid;

pub use self::butterworth::{butterworth_response, ButterworthParams, ButterworthSource};
pub use self::sinusoid::{SinusoidParams, SinusoidSource};
