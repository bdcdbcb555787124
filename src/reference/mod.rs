//! Reference results used as comparison targets.
//!
//! Every record here is immutable literal data; nothing is estimated.

mod table;
mod textile;
mod travel_mode;

pub use table::{ReferenceError, ReferenceTable};
pub use textile::{
    Textile, TextileOlsResults, TheilTextileResults, TEXTILE_DATA, TEXTILE_OLS, THEIL_TEXTILE,
};
pub use travel_mode::{TravelModeChoice, TRAVEL_MODE_CHOICE};
