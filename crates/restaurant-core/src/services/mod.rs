//! Services shared by the front ends.

mod directory;

pub use directory::{Filter, RestaurantDirectory, ReviewSubmission, SavedTo, ALL};
