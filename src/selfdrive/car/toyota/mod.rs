pub mod brake_hold;
pub mod buttons;
pub mod carstate;
pub mod cruise;
pub mod engagement;
pub mod interface;
pub mod lane_keep;
pub mod steering;
pub mod tunes;
pub mod values;

#[cfg(test)]
pub(crate) mod testing;
