//! Human-readable identifiers for projects and products.
//!
//! Project ids are `proj_` followed by six decimal digits; product ids append `_item<N>` to the
//! owning project id, where `N` is the 1-based upload position.

use rand::Rng;

pub const PROJECT_PREFIX: &str = "proj_";
pub const ITEM_MARKER: &str = "_item";

/// How many candidate project ids are drawn before allocation gives up.
pub const MAX_ID_ATTEMPTS: usize = 5;

const PROJECT_NUMBER_MIN: u32 = 100_000;
const PROJECT_NUMBER_MAX: u32 = 999_999;

/// Draws a project id from `rng`.
pub fn project_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}{}",
        PROJECT_PREFIX,
        rng.gen_range(PROJECT_NUMBER_MIN..=PROJECT_NUMBER_MAX)
    )
}

/// Draws a project id from the thread-local RNG.
pub fn new_project_id() -> String {
    project_id(&mut rand::thread_rng())
}

pub fn product_id(project_id: &str, ordinal: usize) -> String {
    format!("{}{}{}", project_id, ITEM_MARKER, ordinal)
}

/// Prefix shared by every product id belonging to `project_id`.
pub fn product_prefix(project_id: &str) -> String {
    format!("{}{}", project_id, ITEM_MARKER)
}

/// Extracts the `_item<N>` ordinal from a product id.
///
/// Ids without the marker, or whose suffix is not a number, sort as ordinal 0.
pub fn product_ordinal(product_id: &str) -> u64 {
    product_id
        .rsplit_once(ITEM_MARKER)
        .and_then(|(_, n)| n.parse::<u64>().ok())
        .unwrap_or(0)
}
